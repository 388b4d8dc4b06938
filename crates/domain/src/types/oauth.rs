//! OAuth exchange types
//!
//! The token pair minted by a refresh exchange and the error body the
//! server returns for rejected requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{UNKNOWN_DESCRIPTION, UNKNOWN_ERROR};

/// Result of a refresh-token exchange
///
/// Transient: the service persists both tokens immediately and drops the
/// pair. Wire names are already snake_case (`access_token`, `expires_in`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Server-provided error payload (`{"error": ..., "error_description": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub error_description: String,
}

impl ApiErrorBody {
    /// Placeholder used when an error body is missing or unparseable.
    #[must_use]
    pub fn unknown() -> Self {
        Self { error: UNKNOWN_ERROR.to_string(), error_description: UNKNOWN_DESCRIPTION.to_string() }
    }

    /// Best-effort parse of a raw response body.
    #[must_use]
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}
