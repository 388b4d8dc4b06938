//! Account holder types

use serde::{Deserialize, Serialize};

/// Personal details of an individual account holder
/// (`GET /account-holder/individual`).
///
/// `date_of_birth` is kept as the server's ISO-8601 date string; converting
/// it into a calendar type is the presentation layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualInfo {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub email: String,
    pub phone: String,
}
