//! # AllSee Infrastructure
//!
//! Impure implementations behind the AllSee API access layer.
//!
//! This crate contains:
//! - The HTTP transport (reqwest) and its closed error taxonomy
//! - The Starling Bank API service with access/refresh token management
//! - Configuration loading (environment, JSON, TOML)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Depends on `allsee-domain` for payloads and configuration
//! - Depends on `allsee-common` for the credential store contract
//! - Contains all "impure" code (network, keychain, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiError, BankApiService, StarlingBankApiService};
pub use errors::InfraError;
pub use http::{Headers, HttpClient, HttpClientBuilder, HttpTransport, NetworkError};
