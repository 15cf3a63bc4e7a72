//! Overdraft alert types
//!
//! Alerts are raised by the balance engine the moment a subscriber's running
//! balance crosses below the overdraft threshold. They live in an append-only
//! in-memory list owned by the engine and are never persisted.

use super::transaction::{SubscriberId, TransactionType};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// Balance below which an overdraft is considered severe
pub const HIGH_SEVERITY_BALANCE: Decimal = Decimal::from_parts(100, 0, 0, true, 0);

/// How serious an overdraft is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    /// Classify a balance: `High` below -100, `Medium` otherwise
    pub fn for_balance(balance: Decimal) -> Self {
        if balance < HIGH_SEVERITY_BALANCE {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Overdraft alert
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub subscriber_id: SubscriberId,

    /// Timestamp of the transaction that pushed the balance into overdraft
    pub timestamp: NaiveDateTime,

    /// Running balance right after that transaction
    pub balance: Decimal,

    pub transaction_amount: Decimal,

    pub transaction_type: TransactionType,

    pub severity: Severity,
}

impl Alert {
    /// Human-readable description, e.g. `Overdraft detected: $50.00`
    pub fn message(&self) -> String {
        format!("Overdraft detected: ${:.2}", self.balance.abs())
    }
}
