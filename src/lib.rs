//! Balance Sync Analyzer Library
//! # Overview
//!
//! This library turns raw balance sync logs into per-subscriber running
//! balances, overdraft alerts and anomaly reports, with a sync and an async
//! processing strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (TransactionRecord, Alert, Anomaly, etc.)
//! - [`config`] - Analysis and anomaly thresholds
//! - [`cli`] - CLI arguments parsing
//! - [`io`] - Input extraction (plain, gzip, zip, documents) and CSV output
//! - [`parse`] - Entry splitting and field extraction
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Running balances and overdraft alerts
//!   - [`core::ledger`] - Balances carried between batches
//!   - [`core::anomaly`] - Large transactions, bursts and balance swings
//!   - [`core::summary`] - Overdraft summaries, balance trends and run statistics
//!   - [`core::behaviour`] - Subscriber frequency, risk score and balance stability
//! - [`strategy`] - Complete pipelines selectable at runtime
//!
//! # Balance Rules
//!
//! - **credit**, **payment**, **refund**: add the amount
//! - **debit**, **charge**, **withdrawal**: subtract the amount
//! - **failed** or **error** status: no effect
//! - Unknown type: falls back to the operation (payment adds, charge subtracts)
//!
//! A record is an overdraft when its running balance is below the threshold
//! (zero by default). An alert is raised when a subscriber crosses into
//! overdraft, with `high` severity below -100.

pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod parse;
pub mod strategy;
pub mod types;

pub use config::{AnalysisConfig, AnomalyConfig};
pub use core::{AnomalyDetector, BalanceEngine, SubscriberLedger};
pub use io::ContentExtractor;
pub use parse::{split_entries, FieldExtractor};
pub use strategy::{create_strategy, AnalysisReport, ProcessingStrategy};
pub use types::{
    Alert, AnalyzerError, Anomaly, BalancedRecord, Severity, Status, TransactionRecord,
    TransactionType,
};
