//! Asynchronous implementations of core components
//!
//! This module provides the concurrent counterparts of the balance engine's
//! state, built on `DashMap` and tokio tasks.
//!
//! - **SharedLedger**: Thread-safe subscriber balances using DashMap
//! - **BatchProcessor**: Folds each subscriber on its own task and merges the
//!   results in subscriber order
//!
//! # Thread Safety
//!
//! Work is partitioned so each subscriber key has exactly one writer:
//! - Different subscribers are folded in parallel
//! - A single subscriber's timeline is always folded sequentially
//! - No global locks; DashMap shards its locking per key

pub mod batch_processor;
pub mod ledger;

pub use batch_processor::{BatchOutcome, BatchProcessor};
pub use ledger::SharedLedger;
