//! Credential storage shared across AllSee crates.
//!
//! # Feature Tiers
//!
//! The [`CredentialStore`] contract and its [`KeychainError`] taxonomy are
//! always available. Implementations are opt-in:
//! - `platform`: [`security::keychain::KeychainProvider`], backed by the OS
//!   keychain (Keychain Access, Credential Manager, Secret Service)
//! - `test-utils`: [`testing::MockKeychainProvider`], an in-memory store with
//!   an operation log for sequence assertions

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod security;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::CredentialStore;
#[cfg(feature = "platform")]
pub use security::KeychainProvider;
pub use security::KeychainError;
