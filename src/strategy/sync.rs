//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates the analysis by coordinating the
//! parsing pipeline, the `BalanceEngine` and the `AnomalyDetector`.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - Extraction and parsing to `parse::ingest`
//! - Running balances and alerts to `BalanceEngine`
//! - Anomaly checks to `AnomalyDetector`

use crate::config::AnalysisConfig;
use crate::core::{AnomalyDetector, BalanceEngine};
use crate::parse::ingest;
use crate::strategy::{AnalysisReport, ProcessingStrategy};
use crate::types::AnalyzerError;
use std::path::Path;

/// Single-threaded analysis pipeline
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, AnalyzerError> {
        let outcome = ingest(input_path, config)?;

        let mut engine = BalanceEngine::with_threshold(config.overdraft_threshold);
        let records = engine.process(outcome.records);

        let anomalies = AnomalyDetector::new(config.anomaly.clone()).detect(&records);

        Ok(AnalysisReport {
            alerts: engine.alerts().to_vec(),
            balances: engine.current_balances(),
            records,
            anomalies,
            parse_stats: outcome.stats,
            synthetic: outcome.synthetic,
        })
    }
}
