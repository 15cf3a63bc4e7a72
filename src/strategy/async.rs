//! Asynchronous per-subscriber processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Running balances are folded with one tokio task
//! per subscriber.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (max_concurrent_batches)
//!     ├── parse::ingest (blocking extraction and parsing)
//!     ├── BatchProcessor (subscriber partitioning + tasks)
//!     │   └── SharedLedger (thread-safe balances)
//!     └── AnomalyDetector
//! ```
//!
//! # Thread-Based Parallelism
//!
//! - Extraction runs on tokio's blocking pool
//! - Records are partitioned by subscriber and each partition is folded on
//!   its own task, sequentially within the subscriber
//! - Results are merged in subscriber id order, so reports match the
//!   synchronous strategy exactly

use crate::config::AnalysisConfig;
use crate::core::{AnomalyDetector, BatchProcessor, SharedLedger};
use crate::parse::ingest;
use crate::strategy::{AnalysisReport, ProcessingStrategy};
use crate::types::AnalyzerError;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Configuration for the async strategy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Worker threads available to subscriber fold tasks
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a batch configuration
    ///
    /// A zero value is invalid and falls back to the default with a warning.
    pub fn new(max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                requested = max_concurrent_batches,
                default = default.max_concurrent_batches,
                "Invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            max_concurrent_batches,
        }
    }
}

/// Multi-threaded analysis pipeline
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, AnalyzerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| AnalyzerError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let path = input_path.to_path_buf();
            let ingest_config = config.clone();
            let outcome = tokio::task::spawn_blocking(move || ingest(&path, &ingest_config))
                .await
                .map_err(|e| AnalyzerError::runtime(format!("Extraction task failed: {}", e)))??;

            let ledger = Arc::new(SharedLedger::new());
            let processor = BatchProcessor::new(Arc::clone(&ledger), config.overdraft_threshold);
            let batch = processor.process_batch(outcome.records).await?;

            let anomalies = AnomalyDetector::new(config.anomaly.clone()).detect(&batch.records);

            Ok(AnalysisReport {
                records: batch.records,
                alerts: batch.alerts,
                anomalies,
                balances: ledger.snapshot(),
                parse_stats: outcome.stats,
                synthetic: outcome.synthetic,
            })
        })
    }
}
