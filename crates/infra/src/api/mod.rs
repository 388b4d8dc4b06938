//! Starling Bank API access
//!
//! Authenticated calls against the account-holder API with automatic
//! access-token refresh.
//!
//! # Architecture
//!
//! - Transport injected as `Arc<dyn HttpTransport>` (no direct reqwest)
//! - Tokens read from and written to an injected `CredentialStore`
//! - One refresh and one retry per call, never more
//! - Concurrent refreshes collapse into a single token exchange

pub mod errors;
pub mod service;

pub use errors::ApiError;
pub use service::{BankApiService, StarlingBankApiService};
