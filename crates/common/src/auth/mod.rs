//! Credential storage for OAuth tokens
//!
//! The API layer never holds tokens beyond a single call; it reads and
//! writes them through a [`CredentialStore`] injected at construction.

pub mod traits;

pub use traits::CredentialStore;
