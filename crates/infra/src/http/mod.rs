//! HTTP transport
//!
//! GET/POST over HTTPS with response validation and a closed error
//! taxonomy. No retries happen at this layer.

pub mod client;
pub mod errors;

pub use client::{HttpClient, HttpClientBuilder, HttpTransport};
pub use errors::NetworkError;

/// Request headers, ordered for deterministic logging and tests
pub type Headers = std::collections::BTreeMap<String, String>;
