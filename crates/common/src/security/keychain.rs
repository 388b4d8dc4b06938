//! Keychain provider for secure credential storage
//!
//! Thin wrapper over the platform keychain: Keychain Access on macOS,
//! Credential Manager on Windows and the kernel keyutils store on Linux. A
//! credential's namespace becomes the keyring *service* and its identifier
//! the keyring *user*, so `(identifier, namespace)` maps onto exactly one
//! platform entry.
//!
//! ## Usage
//!
//! ```no_run
//! use allsee_common::{CredentialStore, KeychainProvider};
//!
//! let keychain = KeychainProvider::new();
//! keychain.upsert(b"token", "accessToken", "uk.co.jaffakree.allsee")?;
//! let secret = keychain.get("accessToken", "uk.co.jaffakree.allsee")?;
//! assert_eq!(secret, b"token");
//! # Ok::<(), allsee_common::KeychainError>(())
//! ```

use keyring::Entry;
use tracing::debug;

use super::KeychainError;
use crate::auth::CredentialStore;

/// OS-native credential store
#[derive(Debug, Clone, Copy, Default)]
pub struct KeychainProvider;

impl KeychainProvider {
    /// Create a keychain provider
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Create a keyring entry
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if entry creation fails
    fn create_entry(identifier: &str, namespace: &str) -> Result<Entry, KeychainError> {
        Entry::new(namespace, identifier).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to create keychain entry: {e}"))
        })
    }

    /// Read the raw secret, keeping "absent" distinct from access failures
    fn read(entry: &Entry, identifier: &str) -> Result<Option<Vec<u8>>, KeychainError> {
        match entry.get_secret() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(KeychainError::AccessFailed(format!(
                "Failed to retrieve secret for {identifier}: {e}"
            ))),
        }
    }

    fn write(entry: &Entry, secret: &[u8], identifier: &str) -> Result<(), KeychainError> {
        entry.set_secret(secret).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to store secret for {identifier}: {e}"))
        })
    }
}

impl CredentialStore for KeychainProvider {
    fn insert(&self, secret: &[u8], identifier: &str, namespace: &str) -> Result<(), KeychainError> {
        debug!(namespace = %namespace, identifier = %identifier, "Inserting secret into keychain");

        let entry = Self::create_entry(identifier, namespace)?;
        if Self::read(&entry, identifier)?.is_some() {
            return Err(KeychainError::DuplicateItem);
        }
        Self::write(&entry, secret, identifier)?;

        debug!(namespace = %namespace, identifier = %identifier, "Secret inserted successfully");
        Ok(())
    }

    fn get(&self, identifier: &str, namespace: &str) -> Result<Vec<u8>, KeychainError> {
        debug!(namespace = %namespace, identifier = %identifier, "Retrieving secret from keychain");

        let entry = Self::create_entry(identifier, namespace)?;
        Self::read(&entry, identifier)?.ok_or(KeychainError::ItemNotFound)
    }

    fn update(&self, secret: &[u8], identifier: &str, namespace: &str) -> Result<(), KeychainError> {
        debug!(namespace = %namespace, identifier = %identifier, "Updating secret in keychain");

        let entry = Self::create_entry(identifier, namespace)?;
        if Self::read(&entry, identifier)?.is_none() {
            return Err(KeychainError::ItemNotFound);
        }
        Self::write(&entry, secret, identifier)
    }

    fn delete(&self, identifier: &str, namespace: &str) -> Result<(), KeychainError> {
        debug!(namespace = %namespace, identifier = %identifier, "Deleting secret from keychain");

        let entry = Self::create_entry(identifier, namespace)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::AccessFailed(format!(
                "Failed to delete secret for {identifier}: {e}"
            ))),
        }
    }
}
