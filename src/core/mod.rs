//! Core business logic module
//!
//! This module contains the balance analysis components:
//! - `ledger` - Per-subscriber closing balances carried between batches
//! - `engine` - Running-balance fold and overdraft alerts
//! - `anomaly` - Per-subscriber statistical anomaly checks
//! - `summary` - Overdraft summaries, balance trends and run statistics
//! - `behaviour` - Per-subscriber frequency, risk and stability profiles
//! - `async` - Concurrent ledger and per-subscriber batch folding

pub mod anomaly;
pub mod r#async;
pub mod behaviour;
pub mod engine;
pub mod ledger;
pub mod summary;

pub use anomaly::AnomalyDetector;
pub use behaviour::subscriber_behaviour;
pub use engine::{balance_change, fold_subscriber, BalanceEngine, SubscriberFold};
pub use ledger::SubscriberLedger;
pub use r#async::{BatchOutcome, BatchProcessor, SharedLedger};
pub use summary::{balance_trends, overdraft_summary, summary_stats};
