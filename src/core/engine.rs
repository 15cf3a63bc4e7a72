//! Balance engine
//!
//! This module provides the `BalanceEngine`, which annotates parsed records
//! with running balances and raises overdraft alerts.
//!
//! The engine enforces these rules:
//! - Each subscriber's records are folded in timestamp order (stable on ties)
//! - Failed and errored transactions never move the balance
//! - Balances carry forward across batches through the ledger
//! - An alert is raised when a balance crosses below the threshold
//! - The `unknown` subscriber is passed through untracked
//!
//! The fold itself is a pure function (`fold_subscriber`) so the async
//! strategy can run it per subscriber on separate tasks.

use crate::core::ledger::SubscriberLedger;
use crate::types::{
    Alert, BalancedRecord, Operation, Severity, SubscriberId, TransactionRecord, TransactionType,
    UNKNOWN_SUBSCRIBER,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Signed effect of a transaction on its subscriber's balance
///
/// # Arguments
///
/// * `record` - The transaction to evaluate
///
/// # Returns
///
/// `+amount` for credits, payments and refunds, `-amount` for debits,
/// charges and withdrawals, and zero for failures. Records of unknown type
/// fall back to their operation (payment adds, charge subtracts).
pub fn balance_change(record: &TransactionRecord) -> Decimal {
    if record.status.is_failure() {
        return Decimal::ZERO;
    }

    match record.transaction_type {
        TransactionType::Credit | TransactionType::Payment | TransactionType::Refund => {
            record.amount
        }
        TransactionType::Debit | TransactionType::Charge | TransactionType::Withdrawal => {
            -record.amount
        }
        TransactionType::Unknown => match record.operation {
            Operation::Payment => record.amount,
            Operation::Charge => -record.amount,
            Operation::CreateSubscription
            | Operation::BalanceSync
            | Operation::Refund
            | Operation::Unknown => Decimal::ZERO,
        },
    }
}

/// Result of folding one subscriber's records
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberFold {
    /// Records in timestamp order with their running balances
    pub records: Vec<BalancedRecord>,

    /// Alerts raised while folding, in order
    pub alerts: Vec<Alert>,

    /// Running balance after the last record
    pub closing_balance: Decimal,
}

/// Fold one subscriber's records into running balances
///
/// # Arguments
///
/// * `records` - Records of a single subscriber, in any order
/// * `opening_balance` - Balance carried forward from earlier batches
/// * `threshold` - Balances strictly below this are overdrafts
///
/// # Returns
///
/// The annotated records, the alerts raised and the closing balance.
pub fn fold_subscriber(
    mut records: Vec<TransactionRecord>,
    opening_balance: Decimal,
    threshold: Decimal,
) -> SubscriberFold {
    records.sort_by_key(|record| record.timestamp);

    let mut balance = opening_balance;
    let mut alerts = Vec::new();
    let mut balanced = Vec::with_capacity(records.len());

    for record in records {
        let previous = balance;
        let mut change = balance_change(&record);
        balance = match previous.checked_add(change) {
            Some(next) => next,
            None => {
                // Clamp and record the applied change so balances stay cumulative
                let clamped = if change.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                };
                warn!(
                    subscriber = %record.subscriber_id,
                    change = %change,
                    applied = %(clamped - previous),
                    "Running balance saturated"
                );
                change = clamped - previous;
                clamped
            }
        };
        let is_overdraft = balance < threshold;

        if is_overdraft && previous >= threshold {
            let alert = Alert {
                subscriber_id: record.subscriber_id.clone(),
                timestamp: record.timestamp,
                balance,
                transaction_amount: record.amount,
                transaction_type: record.transaction_type,
                severity: Severity::for_balance(balance),
            };
            warn!(
                subscriber = %alert.subscriber_id,
                balance = %balance,
                severity = alert.severity.as_str(),
                "Overdraft alert"
            );
            alerts.push(alert);
        }

        balanced.push(BalancedRecord {
            record,
            balance_change: change,
            running_balance: balance,
            is_overdraft,
        });
    }

    SubscriberFold {
        records: balanced,
        alerts,
        closing_balance: balance,
    }
}

/// Group records by subscriber, in subscriber id order
///
/// Each group keeps the records in their input order.
pub fn partition_by_subscriber(
    records: Vec<TransactionRecord>,
) -> BTreeMap<SubscriberId, Vec<TransactionRecord>> {
    let mut partitions: BTreeMap<SubscriberId, Vec<TransactionRecord>> = BTreeMap::new();

    for record in records {
        partitions
            .entry(record.subscriber_id.clone())
            .or_default()
            .push(record);
    }

    partitions
}

/// Pass `unknown` subscriber records through without a balance
pub fn untracked(mut records: Vec<TransactionRecord>) -> Vec<BalancedRecord> {
    records.sort_by_key(|record| record.timestamp);
    records.into_iter().map(BalancedRecord::untracked).collect()
}

/// Stateful per-subscriber balance engine
///
/// Owns the ledger and the alert list. Feeding the same batch twice
/// double-counts it; call `reset` first to start over.
#[derive(Debug, Clone, Default)]
pub struct BalanceEngine {
    ledger: SubscriberLedger,
    alerts: Vec<Alert>,
    threshold: Decimal,
}

impl BalanceEngine {
    /// Create an engine with an empty ledger and a zero overdraft threshold
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an empty ledger and a custom threshold
    pub fn with_threshold(threshold: Decimal) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Create an engine that continues from an existing ledger
    ///
    /// # Arguments
    ///
    /// * `ledger` - Balances carried over from earlier runs
    /// * `threshold` - Overdraft threshold
    pub fn with_ledger(ledger: SubscriberLedger, threshold: Decimal) -> Self {
        Self {
            ledger,
            alerts: Vec::new(),
            threshold,
        }
    }

    /// Annotate a batch of records with running balances
    ///
    /// # Arguments
    ///
    /// * `records` - Parsed records in any order
    ///
    /// # Returns
    ///
    /// All records, ordered by subscriber id and then timestamp. Records of
    /// the `unknown` subscriber come back with zero change and balance.
    ///
    /// # Side Effects
    ///
    /// Stores each subscriber's closing balance in the ledger and appends
    /// any alerts raised to the engine's alert list.
    pub fn process(&mut self, records: Vec<TransactionRecord>) -> Vec<BalancedRecord> {
        let mut output = Vec::with_capacity(records.len());

        for (subscriber_id, partition) in partition_by_subscriber(records) {
            if subscriber_id == UNKNOWN_SUBSCRIBER {
                output.extend(untracked(partition));
                continue;
            }

            let fold = fold_subscriber(partition, self.ledger.balance(&subscriber_id), self.threshold);
            self.ledger.set_balance(&subscriber_id, fold.closing_balance);
            self.alerts.extend(fold.alerts);
            output.extend(fold.records);
        }

        info!(
            records = output.len(),
            subscribers = self.ledger.len(),
            alerts = self.alerts.len(),
            "Balances computed"
        );

        output
    }

    pub fn ledger(&self) -> &SubscriberLedger {
        &self.ledger
    }

    /// Alerts raised since creation or the last reset
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Current balance of every tracked subscriber, sorted by id
    pub fn current_balances(&self) -> BTreeMap<SubscriberId, Decimal> {
        self.ledger.snapshot()
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Clear the ledger and the alert list
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.alerts.clear();
    }
}
