//! API-specific error types
//!
//! Every failure of a public service operation is reported as an
//! [`ApiError`]. Transport failures never escape raw; they are wrapped in
//! [`ApiError::InvalidResponse`].

use std::error::Error as StdError;

use thiserror::Error;

use crate::http::NetworkError;

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No access token in the credential store")]
    MissingAccessToken,

    #[error("No refresh token in the credential store")]
    MissingRefreshToken,

    /// The server rejected the token again after a successful refresh
    #[error("Access token rejected after refresh")]
    InvalidToken,

    #[error("Invalid response: {0}")]
    InvalidResponse(#[source] NetworkError),

    #[error("Response data corrupted: {0}")]
    DataCorrupted(#[source] serde_json::Error),

    #[error("Could not refresh token: {error} ({description})")]
    CouldNotRefreshToken { error: String, description: String },

    #[error("Unknown error: {0}")]
    UnknownError(#[source] Box<dyn StdError + Send + Sync>),
}

impl ApiError {
    /// Whether signing in again is the only way forward
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::MissingAccessToken
                | Self::MissingRefreshToken
                | Self::InvalidToken
                | Self::CouldNotRefreshToken { .. }
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorrupted(err)
    }
}
