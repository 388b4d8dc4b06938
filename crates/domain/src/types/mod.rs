//! Domain types and models
//!
//! Payload shapes exchanged with the Starling Bank API. Field names follow
//! the wire casing through serde attributes; Rust-side names stay
//! snake_case.

pub mod account;
pub mod balance;
pub mod individual;
pub mod oauth;

pub use account::{Account, AccountsList};
pub use balance::{Balance, SignedCurrencyAndAmount};
pub use individual::IndividualInfo;
pub use oauth::{ApiErrorBody, TokenPair};
