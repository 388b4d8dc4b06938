//! Balance types
//!
//! Returned by `GET /accounts/{accountUid}/balance`. Amounts are in minor
//! units (pence, cents) and may be negative.

use serde::{Deserialize, Serialize};

/// Signed amount in a specific currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedCurrencyAndAmount {
    pub currency: String,
    pub minor_units: i64,
}

/// Account balance breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub cleared_balance: SignedCurrencyAndAmount,
    pub effective_balance: SignedCurrencyAndAmount,
    pub pending_transactions: SignedCurrencyAndAmount,
    pub accepted_overdraft: SignedCurrencyAndAmount,
    pub amount: SignedCurrencyAndAmount,
    pub total_cleared_balance: SignedCurrencyAndAmount,
    pub total_effective_balance: SignedCurrencyAndAmount,
}
