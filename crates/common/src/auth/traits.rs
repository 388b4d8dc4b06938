//! Trait for credential store operations
//!
//! This trait abstracts keychain/credential storage so the API service can
//! run against the OS keychain in production and an in-memory double in
//! tests.

use tracing::debug;

use crate::security::KeychainError;

/// Named secrets keyed by `(identifier, namespace)`
///
/// Operations are synchronous. Implementations must be cheap enough to call
/// from an async context without offloading (a keychain lookup or a map
/// access). Two different namespaces never collide.
pub trait CredentialStore: Send + Sync {
    /// Store a new secret
    ///
    /// # Errors
    /// Returns `KeychainError::DuplicateItem` if an entry already exists at
    /// `(identifier, namespace)`
    fn insert(&self, secret: &[u8], identifier: &str, namespace: &str)
        -> Result<(), KeychainError>;

    /// Retrieve a secret
    ///
    /// # Errors
    /// Returns `KeychainError::ItemNotFound` if no entry exists
    fn get(&self, identifier: &str, namespace: &str) -> Result<Vec<u8>, KeychainError>;

    /// Replace an existing secret
    ///
    /// # Errors
    /// Returns `KeychainError::ItemNotFound` if no entry exists
    fn update(&self, secret: &[u8], identifier: &str, namespace: &str)
        -> Result<(), KeychainError>;

    /// Remove a secret (idempotent)
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if the backing store refuses
    /// the deletion; a missing entry is not an error
    fn delete(&self, identifier: &str, namespace: &str) -> Result<(), KeychainError>;

    /// Update the secret if present, insert it otherwise
    ///
    /// Always a `get` followed by either `update` or `insert`, never a
    /// single replace, so every backing store observes the same sequence.
    ///
    /// # Errors
    /// Propagates any error other than `ItemNotFound` from the lookup, and
    /// any error from the write.
    fn upsert(&self, secret: &[u8], identifier: &str, namespace: &str) -> Result<(), KeychainError> {
        match self.get(identifier, namespace) {
            Ok(_) => {
                debug!(identifier = %identifier, namespace = %namespace, "Updating existing credential");
                self.update(secret, identifier, namespace)
            }
            Err(KeychainError::ItemNotFound) => {
                debug!(identifier = %identifier, namespace = %namespace, "Inserting new credential");
                self.insert(secret, identifier, namespace)
            }
            Err(e) => Err(e),
        }
    }

    /// Check whether a secret exists
    fn exists(&self, identifier: &str, namespace: &str) -> bool {
        self.get(identifier, namespace).is_ok()
    }
}
