//! Thread-safe subscriber ledger for async balance folding
//!
//! This module provides the `SharedLedger` struct, the concurrent counterpart
//! of `SubscriberLedger`.
//!
//! # Design
//!
//! Balances live in a `DashMap`, so tasks folding different subscribers read
//! and write without contending on a global lock. The batch processor hands
//! each subscriber to exactly one task, which makes that task the only writer
//! for its key.

use crate::types::{SubscriberId, UNKNOWN_SUBSCRIBER};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct SharedLedger {
    balances: DashMap<SubscriberId, Decimal>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance the subscriber's next transaction starts from, zero if unseen
    pub fn balance(&self, subscriber_id: &str) -> Decimal {
        self.balances
            .get(subscriber_id)
            .map(|entry| *entry.value())
            .unwrap_or(Decimal::ZERO)
    }

    /// Store a subscriber's closing balance
    ///
    /// # Returns
    ///
    /// `false` if the subscriber is `unknown` and nothing was stored
    pub fn set_balance(&self, subscriber_id: &str, balance: Decimal) -> bool {
        if subscriber_id == UNKNOWN_SUBSCRIBER {
            return false;
        }
        self.balances.insert(subscriber_id.to_string(), balance);
        true
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// All balances, sorted by subscriber id
    pub fn snapshot(&self) -> BTreeMap<SubscriberId, Decimal> {
        self.balances
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn clear(&self) {
        self.balances.clear();
    }
}
