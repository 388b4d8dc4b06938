//! Mock implementations for testing
//!
//! Thread-safe in-memory stand-ins for the platform keychain.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::auth::CredentialStore;
use crate::security::KeychainError;

type Key = (String, String);

/// One call observed by [`MockKeychainProvider`], in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    Insert { identifier: String, namespace: String },
    Get { identifier: String, namespace: String },
    Update { identifier: String, namespace: String },
    Delete { identifier: String, namespace: String },
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<Key, Vec<u8>>,
    operations: Vec<StoreOperation>,
    failing_writes: HashSet<String>,
}

/// In-memory credential store
///
/// Clones share the same storage, so a test can hand one clone to the code
/// under test and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MockKeychainProvider {
    state: Arc<Mutex<State>>,
}

impl MockKeychainProvider {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `(identifier, namespace, secret)`
    /// entries. Seeding is not recorded in the operation log.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str, &'a [u8])>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            for (identifier, namespace, secret) in entries {
                state.entries.insert(key(identifier, namespace), secret.to_vec());
            }
        }
        store
    }

    /// Make every `insert`/`update`/`delete` for `identifier` fail with
    /// `KeychainError::AccessFailed`, in any namespace.
    pub fn fail_writes_for(&self, identifier: &str) {
        self.lock().failing_writes.insert(identifier.to_string());
    }

    /// Stored secret as UTF-8, if present and valid
    #[must_use]
    pub fn secret_string(&self, identifier: &str, namespace: &str) -> Option<String> {
        self.lock()
            .entries
            .get(&key(identifier, namespace))
            .and_then(|secret| String::from_utf8(secret.clone()).ok())
    }

    /// Every operation performed so far
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.lock().operations.clone()
    }

    /// Forget recorded operations, keeping stored entries
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Number of stored entries across all namespaces
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    // A panicking test thread must not cascade into unrelated assertions.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_write(state: &State, identifier: &str) -> Result<(), KeychainError> {
        if state.failing_writes.contains(identifier) {
            return Err(KeychainError::AccessFailed(format!(
                "Simulated write failure for {identifier}"
            )));
        }
        Ok(())
    }
}

fn key(identifier: &str, namespace: &str) -> Key {
    (namespace.to_string(), identifier.to_string())
}

impl CredentialStore for MockKeychainProvider {
    fn insert(&self, secret: &[u8], identifier: &str, namespace: &str) -> Result<(), KeychainError> {
        let mut state = self.lock();
        state.operations.push(StoreOperation::Insert {
            identifier: identifier.to_string(),
            namespace: namespace.to_string(),
        });
        Self::check_write(&state, identifier)?;

        let key = key(identifier, namespace);
        if state.entries.contains_key(&key) {
            return Err(KeychainError::DuplicateItem);
        }
        state.entries.insert(key, secret.to_vec());
        Ok(())
    }

    fn get(&self, identifier: &str, namespace: &str) -> Result<Vec<u8>, KeychainError> {
        let mut state = self.lock();
        state.operations.push(StoreOperation::Get {
            identifier: identifier.to_string(),
            namespace: namespace.to_string(),
        });
        state.entries.get(&key(identifier, namespace)).cloned().ok_or(KeychainError::ItemNotFound)
    }

    fn update(&self, secret: &[u8], identifier: &str, namespace: &str) -> Result<(), KeychainError> {
        let mut state = self.lock();
        state.operations.push(StoreOperation::Update {
            identifier: identifier.to_string(),
            namespace: namespace.to_string(),
        });
        Self::check_write(&state, identifier)?;

        match state.entries.get_mut(&key(identifier, namespace)) {
            Some(existing) => {
                *existing = secret.to_vec();
                Ok(())
            }
            None => Err(KeychainError::ItemNotFound),
        }
    }

    fn delete(&self, identifier: &str, namespace: &str) -> Result<(), KeychainError> {
        let mut state = self.lock();
        state.operations.push(StoreOperation::Delete {
            identifier: identifier.to_string(),
            namespace: namespace.to_string(),
        });
        Self::check_write(&state, identifier)?;

        state.entries.remove(&key(identifier, namespace));
        Ok(())
    }
}
