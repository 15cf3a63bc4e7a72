//! Analysis configuration
//!
//! Knobs for the ingestion pipeline, the balance engine and the anomaly
//! detector. The CLI builds an `AnalysisConfig` from its arguments; library
//! callers can start from `AnalysisConfig::default()`.

use chrono::Duration;
use rust_decimal::Decimal;

/// Default per-member decompressed size limit (256 MiB)
pub const DEFAULT_MAX_MEMBER_BYTES: u64 = 256 * 1024 * 1024;

/// Configuration for the whole analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Running balances strictly below this value are overdrafts
    pub overdraft_threshold: Decimal,

    /// Emit illustrative synthetic records when an input holds only
    /// skip messages
    ///
    /// Off by default: turning it on can hide genuine ingestion failures.
    pub synthetic_fallback: bool,

    /// Maximum number of decompressed bytes read from any single file or
    /// archive member
    pub max_member_bytes: u64,

    pub anomaly: AnomalyConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            overdraft_threshold: Decimal::ZERO,
            synthetic_fallback: false,
            max_member_bytes: DEFAULT_MAX_MEMBER_BYTES,
            anomaly: AnomalyConfig::default(),
        }
    }
}

/// Thresholds used by the anomaly detector
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyConfig {
    /// Subscribers with fewer records are not analysed
    pub min_records: usize,

    /// Amounts strictly above this percentile of the subscriber's own
    /// amounts are large transactions
    pub large_percentile: u32,

    /// Consecutive transactions closer than this are a burst
    pub rapid_window: Duration,

    /// Balance differences beyond this many standard deviations are swings
    pub swing_sigma: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_records: 5,
            large_percentile: 95,
            rapid_window: Duration::minutes(5),
            swing_sigma: 3.0,
        }
    }
}
