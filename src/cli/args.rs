use crate::config::{AnalysisConfig, DEFAULT_MAX_MEMBER_BYTES};
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Analyze balance sync logs for running balances, overdrafts and anomalies
#[derive(Parser, Debug)]
#[command(name = "balance-sync-analyzer")]
#[command(
    about = "Analyze balance sync logs for running balances, overdrafts and anomalies",
    long_about = None
)]
pub struct CliArgs {
    /// Input log file (plain text, .gz, .zip, .docx or .doc)
    #[arg(value_name = "INPUT", help = "Path to the input log file or archive")]
    pub input_file: PathBuf,

    /// Processing strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for single-threaded or 'async' for per-subscriber tasks"
    )]
    pub strategy: StrategyType,

    /// Which CSV report to write to stdout
    #[arg(long = "output", value_name = "REPORT", default_value = "records")]
    pub output: OutputKind,

    /// Overdraft threshold; balances strictly below it are overdrafts
    #[arg(
        long = "threshold",
        value_name = "AMOUNT",
        default_value = "0",
        allow_negative_numbers = true
    )]
    pub threshold: Decimal,

    /// Emit synthetic demonstration records when an input holds only skip messages
    #[arg(long = "synthetic-fallback")]
    pub synthetic_fallback: bool,

    /// Maximum decompressed size of any single file or archive member, in MiB
    #[arg(long = "max-member-mb", value_name = "MB")]
    pub max_member_mb: Option<u64>,

    /// Worker threads for the async strategy
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of worker threads folding subscribers (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// CSV reports the binary can write
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    /// Every record with its running balance
    Records,
    /// Closing balance per subscriber
    Balances,
    /// Overdraft alerts
    Alerts,
    /// Detected anomalies
    Anomalies,
    /// Balance trend per subscriber
    Trends,
    /// Run statistics as metric/value pairs
    Summary,
    /// Frequency, risk score and balance stability per subscriber
    Behaviour,
}

impl CliArgs {
    /// Create an AnalysisConfig from CLI arguments
    ///
    /// Anomaly thresholds always take their defaults. A zero member limit is
    /// invalid and falls back to the default.
    pub fn to_analysis_config(&self) -> AnalysisConfig {
        let max_member_bytes = match self.max_member_mb {
            Some(mb) if mb > 0 => mb.saturating_mul(BYTES_PER_MB),
            Some(_) => {
                tracing::warn!(
                    default = DEFAULT_MAX_MEMBER_BYTES / BYTES_PER_MB,
                    "Invalid max-member-mb (0), using default"
                );
                DEFAULT_MAX_MEMBER_BYTES
            }
            None => DEFAULT_MAX_MEMBER_BYTES,
        };

        AnalysisConfig {
            overdraft_threshold: self.threshold,
            synthetic_fallback: self.synthetic_fallback,
            max_member_bytes,
            ..AnalysisConfig::default()
        }
    }

    /// Create a BatchConfig from CLI arguments
    ///
    /// # Returns
    ///
    /// A `BatchConfig` with the requested worker count, or the defaults
    pub fn to_batch_config(&self) -> BatchConfig {
        match self.max_concurrent_batches {
            Some(max_concurrent_batches) => BatchConfig::new(max_concurrent_batches),
            None => BatchConfig::default(),
        }
    }
}
