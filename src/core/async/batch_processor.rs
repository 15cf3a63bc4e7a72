//! Batch processing with subscriber-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which folds running
//! balances for many subscribers concurrently while keeping each
//! subscriber's timeline strictly sequential.
//!
//! # Design
//!
//! A batch is partitioned by subscriber id and every partition is folded on
//! its own tokio task with the same pure fold the synchronous engine uses.
//! One task per subscriber means one writer per ledger key. Task results are
//! merged back in subscriber id order, so the output is identical to the
//! synchronous engine's.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── Arc<SharedLedger>  (balances carried between batches)
//!     └── threshold          (overdraft threshold)
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{error, info};

use super::SharedLedger;
use crate::core::engine::{fold_subscriber, untracked};
use crate::types::{
    Alert, AnalyzerError, BalancedRecord, SubscriberId, TransactionRecord, UNKNOWN_SUBSCRIBER,
};

/// Records and alerts produced by folding one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Balanced records, ordered by subscriber id and then timestamp
    pub records: Vec<BalancedRecord>,

    /// Alerts raised, in subscriber id order
    pub alerts: Vec<Alert>,
}

/// Folded output of one subscriber partition
#[derive(Debug)]
struct PartitionResult {
    subscriber_id: SubscriberId,
    records: Vec<BalancedRecord>,
    alerts: Vec<Alert>,
}

/// Concurrent per-subscriber balance folder
///
/// Cloneable so each spawned task can own a handle to the shared ledger.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    ledger: Arc<SharedLedger>,
    threshold: Decimal,
}

impl BatchProcessor {
    /// Create a new batch processor
    ///
    /// # Arguments
    ///
    /// * `ledger` - Shared ledger the processor reads and updates
    /// * `threshold` - Overdraft threshold
    pub fn new(ledger: Arc<SharedLedger>, threshold: Decimal) -> Self {
        Self { ledger, threshold }
    }

    pub fn ledger(&self) -> &Arc<SharedLedger> {
        &self.ledger
    }

    /// Partition a batch by subscriber id
    ///
    /// Each partition keeps its records in input order.
    pub fn partition_by_subscriber(
        &self,
        batch: Vec<TransactionRecord>,
    ) -> HashMap<SubscriberId, Vec<TransactionRecord>> {
        let mut partitions: HashMap<SubscriberId, Vec<TransactionRecord>> = HashMap::new();

        for record in batch {
            partitions
                .entry(record.subscriber_id.clone())
                .or_default()
                .push(record);
        }

        partitions
    }

    /// Fold one subscriber's records against the shared ledger
    ///
    /// # Side Effects
    ///
    /// Stores the subscriber's closing balance in the shared ledger. The
    /// `unknown` subscriber is passed through untracked.
    fn process_subscriber(
        &self,
        subscriber_id: SubscriberId,
        records: Vec<TransactionRecord>,
    ) -> PartitionResult {
        if subscriber_id == UNKNOWN_SUBSCRIBER {
            return PartitionResult {
                subscriber_id,
                records: untracked(records),
                alerts: Vec::new(),
            };
        }

        let fold = fold_subscriber(records, self.ledger.balance(&subscriber_id), self.threshold);
        self.ledger.set_balance(&subscriber_id, fold.closing_balance);

        PartitionResult {
            subscriber_id,
            records: fold.records,
            alerts: fold.alerts,
        }
    }

    /// Fold a batch with one task per subscriber
    ///
    /// # Arguments
    ///
    /// * `batch` - Records of any number of subscribers, in any order
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOutcome)` - All records and alerts, merged in subscriber order
    /// * `Err(AnalyzerError::RuntimeError)` - A folding task panicked
    pub async fn process_batch(
        &self,
        batch: Vec<TransactionRecord>,
    ) -> Result<BatchOutcome, AnalyzerError> {
        let partitions = self.partition_by_subscriber(batch);
        let subscribers = partitions.len();

        let mut tasks = Vec::with_capacity(subscribers);
        for (subscriber_id, records) in partitions {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_subscriber(subscriber_id, records)
            }));
        }

        let mut merged: BTreeMap<SubscriberId, PartitionResult> = BTreeMap::new();
        for joined in join_all(tasks).await {
            match joined {
                Ok(result) => {
                    merged.insert(result.subscriber_id.clone(), result);
                }
                Err(e) => {
                    error!(error = %e, "Subscriber fold task failed");
                    return Err(AnalyzerError::runtime(format!(
                        "Subscriber fold task failed: {}",
                        e
                    )));
                }
            }
        }

        let mut outcome = BatchOutcome::default();
        for (_, result) in merged {
            outcome.records.extend(result.records);
            outcome.alerts.extend(result.alerts);
        }

        info!(
            records = outcome.records.len(),
            subscribers,
            alerts = outcome.alerts.len(),
            "Balances computed"
        );

        Ok(outcome)
    }
}
