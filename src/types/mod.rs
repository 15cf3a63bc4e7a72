//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Transaction records and their closed vocabularies
//! - `alert`: Overdraft alerts
//! - `anomaly`: Anomalies found by the detector
//! - `stats`: Parse and record statistics
//! - `summary`: Overdraft summaries, trends, run statistics and behaviour
//! - `error`: Error types for the analyzer

pub mod alert;
pub mod anomaly;
pub mod error;
pub mod stats;
pub mod summary;
pub mod transaction;

pub use alert::{Alert, Severity};
pub use anomaly::Anomaly;
pub use error::AnalyzerError;
pub use stats::{ParseStats, RecordStats};
pub use summary::{
    BalanceStability, BalanceTrend, Frequency, OverdraftSummary, SubscriberBehaviour,
    SubscriberOverdraft, SummaryStats, TrendDirection,
};
pub use transaction::{
    BalancedRecord, Operation, Provenance, RecordOrigin, Status, SubscriberId, TransactionRecord,
    TransactionType, UNKNOWN_SUBSCRIBER,
};
