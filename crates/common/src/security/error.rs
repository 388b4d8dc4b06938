//! Credential store error types

use thiserror::Error;

/// Keychain error types
///
/// Closed set shared by every [`CredentialStore`](crate::CredentialStore)
/// implementation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeychainError {
    /// An entry already exists at the requested key
    #[error("Duplicate keychain item")]
    DuplicateItem,

    /// No entry exists at the requested key
    #[error("Keychain item not found")]
    ItemNotFound,

    /// Keychain access failed (permission denied, not available, etc.)
    #[error("Keychain access failed: {0}")]
    AccessFailed(String),
}
