//! Security primitives
//!
//! The credential store error taxonomy and, with the `platform` feature,
//! the OS keychain provider.

pub mod error;
#[cfg(feature = "platform")]
pub mod keychain;

pub use error::KeychainError;
#[cfg(feature = "platform")]
pub use keychain::KeychainProvider;
