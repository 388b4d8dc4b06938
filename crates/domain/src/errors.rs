//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for AllSee construction and configuration paths.
///
/// Request-level failures have their own taxonomies in the infrastructure
/// crate; this type covers loading configuration and building clients.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AllSeeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for AllSee operations
pub type Result<T> = std::result::Result<T, AllSeeError>;
