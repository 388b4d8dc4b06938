//! Testing utilities and helpers
//!
//! - **[`mocks`]**: in-memory implementations of the credential store
//!
//! ## Usage
//!
//! ```rust
//! use allsee_common::testing::MockKeychainProvider;
//! use allsee_common::CredentialStore;
//!
//! let store = MockKeychainProvider::new();
//! store.upsert(b"token", "accessToken", "test.namespace").unwrap();
//! assert_eq!(store.get("accessToken", "test.namespace").unwrap(), b"token");
//! ```

pub mod mocks;

pub use mocks::{MockKeychainProvider, StoreOperation};
