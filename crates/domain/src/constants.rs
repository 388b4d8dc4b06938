//! Application constants
//!
//! Credential store keys, API endpoints and OAuth protocol values shared by
//! the service layer and its tests.

// Credential store keys
pub const KEYCHAIN_SERVICE: &str = "uk.co.jaffakree.allsee";
pub const ACCESS_TOKEN_IDENTIFIER: &str = "accessToken";
pub const REFRESH_TOKEN_IDENTIFIER: &str = "refreshToken";

// Starling Bank endpoints
pub const DEFAULT_API_BASE_URL: &str = "https://api-sandbox.starlingbank.com/api/v2";
pub const DEFAULT_TOKEN_URL: &str = "https://api-sandbox.starlingbank.com/oauth/access-token";
pub const ACCOUNTS_PATH: &str = "accounts";
pub const INDIVIDUAL_PATH: &str = "account-holder/individual";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// OAuth protocol values
pub const REFRESH_GRANT_TYPE: &str = "refresh_token";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const INVALID_TOKEN_STATUS: u16 = 403;
pub const INVALID_TOKEN_ERROR: &str = "invalid_token";
pub const REFRESH_REJECTED_STATUS: u16 = 400;

// Placeholders used when an error body cannot be parsed
pub const UNKNOWN_ERROR: &str = "unknown_error";
pub const UNKNOWN_DESCRIPTION: &str = "unknown_description";
