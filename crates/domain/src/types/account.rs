//! Account types
//!
//! Accounts held by the authenticated account holder, as returned by
//! `GET /accounts`.

use serde::{Deserialize, Serialize};

/// A single account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_uid: String,
    pub account_type: String,
    pub default_category: String,
    pub currency: String,
    pub created_at: String,
    pub name: String,
}

/// Accounts held by an account holder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsList {
    pub accounts: Vec<Account>,
}
