//! Subscriber ledger
//!
//! This module provides the `SubscriberLedger`, the balance engine's memory of
//! each subscriber's balance between batches.
//!
//! The ledger is responsible for:
//! - Seeding new subscribers at zero
//! - Carrying closing balances forward to the next batch
//! - Never tracking the `unknown` subscriber
//! - Providing sorted balance snapshots for output

use crate::types::{SubscriberId, UNKNOWN_SUBSCRIBER};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Per-subscriber closing balances
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriberLedger {
    balances: HashMap<SubscriberId, Decimal>,
}

impl SubscriberLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance the subscriber's next transaction starts from
    ///
    /// Subscribers the ledger has never seen start at zero.
    pub fn balance(&self, subscriber_id: &str) -> Decimal {
        self.balances
            .get(subscriber_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Store a subscriber's closing balance
    ///
    /// # Arguments
    ///
    /// * `subscriber_id` - Subscriber whose batch was folded
    /// * `balance` - Running balance after their last transaction
    ///
    /// # Returns
    ///
    /// `false` if the subscriber is `unknown` and nothing was stored
    pub fn set_balance(&mut self, subscriber_id: &str, balance: Decimal) -> bool {
        if subscriber_id == UNKNOWN_SUBSCRIBER {
            return false;
        }
        self.balances.insert(subscriber_id.to_string(), balance);
        true
    }

    pub fn contains(&self, subscriber_id: &str) -> bool {
        self.balances.contains_key(subscriber_id)
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
            .map(|(id, balance)| (id.clone(), *balance))
            .collect()
    }

    /// Forget every subscriber
    pub fn clear(&mut self) {
        self.balances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_subscriber_starts_at_zero() {
        let ledger = SubscriberLedger::new();
        assert_eq!(ledger.balance("sub_1"), Decimal::ZERO);
        assert!(!ledger.contains("sub_1"));
    }

    #[test]
    fn test_set_balance_carries_forward() {
        let mut ledger = SubscriberLedger::new();

        assert!(ledger.set_balance("sub_1", Decimal::new(-5025, 2)));

        assert_eq!(ledger.balance("sub_1"), Decimal::new(-5025, 2));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_unknown_subscriber_is_never_stored() {
        let mut ledger = SubscriberLedger::new();

        assert!(!ledger.set_balance(UNKNOWN_SUBSCRIBER, Decimal::ONE));

        assert!(ledger.is_empty());
    }

    #[test]
    fn test_snapshot_is_sorted_and_clear_empties() {
        let mut ledger = SubscriberLedger::new();
        ledger.set_balance("sub_b", Decimal::ONE);
        ledger.set_balance("sub_a", Decimal::TWO);

        let keys: Vec<String> = ledger.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["sub_a".to_string(), "sub_b".to_string()]);

        ledger.clear();
        assert!(ledger.is_empty());
    }
}
