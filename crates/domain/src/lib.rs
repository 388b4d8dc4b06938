//! # AllSee Domain
//!
//! Domain types shared by the AllSee banking client.
//!
//! This crate contains:
//! - Wire payload types for the Starling Bank API (accounts, account holder,
//!   balances, OAuth token exchange, error bodies)
//! - Configuration structures
//! - Domain error types and Result definitions
//! - Credential store keys and endpoint constants
//!
//! ## Architecture
//! - No dependencies on other AllSee crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
