//! Transport error types

use std::error::Error as StdError;

use thiserror::Error;

/// Transport-level failures
///
/// Every failure of a transport call lands in exactly one variant.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Request timed out")]
    RequestTimedOut,

    #[error("Not connected to the internet")]
    NotConnectedToInternet,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-2xx response; the body is kept for caller-side error parsing
    #[error("Bad server response: HTTP {status_code}")]
    BadServerResponse { status_code: u16, body: Option<Vec<u8>> },

    #[error("Unknown network error: {0}")]
    UnknownError(#[source] Box<dyn StdError + Send + Sync>),
}

impl NetworkError {
    /// Status code of a rejected response, if any
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::BadServerResponse { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Raw body of a rejected response, if one was read
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::BadServerResponse { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::RequestTimedOut;
        }

        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return Self::NotConnectedToInternet;
        }

        if err.is_builder() {
            if let Some(url) = err.url() {
                return Self::InvalidUrl(url.to_string());
            }
        }

        Self::UnknownError(Box::new(err))
    }
}
