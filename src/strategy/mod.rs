//! Processing strategy module for balance analysis
//!
//! This module defines the Strategy pattern for the complete analysis
//! pipeline, from extracting the input through balance folding to anomaly
//! detection. Different implementations (synchronous, asynchronous per
//! subscriber) can be selected at runtime and produce identical reports.

use crate::cli::StrategyType;
use crate::config::AnalysisConfig;
use crate::types::AnalyzerError;
use std::path::Path;

pub mod r#async;
pub mod report;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use report::AnalysisReport;
pub use sync::SyncProcessingStrategy;

/// Complete analysis pipeline
///
/// Implementations ingest the input path, fold running balances, raise
/// alerts and detect anomalies.
pub trait ProcessingStrategy: Send + Sync {
    /// Analyse one input path
    ///
    /// # Arguments
    ///
    /// * `input_path` - Plain, gzip, zip or document input
    /// * `config` - Analysis configuration
    ///
    /// # Returns
    ///
    /// * `Ok(AnalysisReport)` - Records, alerts, anomalies and balances
    /// * `Err(AnalyzerError)` - The input is missing or yielded no records,
    ///   or the runtime failed
    fn process(
        &self,
        input_path: &Path,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, AnalyzerError>;
}

/// Create a processing strategy
///
/// # Arguments
///
/// * `strategy_type` - Which pipeline to run
/// * `config` - Batch configuration for the async strategy; defaults when `None`
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
