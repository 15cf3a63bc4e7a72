//! Balance Sync Analyzer CLI
//!
//! Command-line interface for analysing balance sync logs.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- balance-sync.log > records.csv
//! cargo run -- --strategy sync logs.zip > records.csv
//! cargo run -- --output alerts --threshold 10 logs.log.gz > alerts.csv
//! cargo run -- --output trends --max-concurrent 8 logs.zip > trends.csv
//! cargo run -- --output behaviour logs.log > behaviour.csv
//! ```
//!
//! The program extracts the input, folds running balances per subscriber,
//! raises overdraft alerts and detects anomalies, then writes the selected
//! CSV report to stdout. Logs go to stderr; set `RUST_LOG` to override the
//! level.
//!
//! # Processing Strategies
//!
//! - **sync**: Single-threaded pipeline
//! - **async**: Per-subscriber tokio tasks (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing input, no records recovered, output failure, etc.)

use balance_sync_analyzer::cli;
use balance_sync_analyzer::strategy;
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = cli::parse_args();
    init_tracing(args.verbose);

    let config = args.to_analysis_config();
    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, batch_config)
    };

    let report = match strategy.process(&args.input_file, &config) {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, input = %args.input_file.display(), "Analysis failed");
            process::exit(1);
        }
    };

    if report.synthetic {
        warn!("Report is built from synthetic demonstration records");
    }

    let summary = report.overdraft_summary();
    let record_stats = report.record_stats();
    info!(
        records = record_stats.total,
        with_amount = record_stats.with_amount,
        overdraft_keyword = record_stats.overdraft_keyword,
        subscribers = record_stats.unique_subscribers,
        alerts = report.alerts.len(),
        anomalies = report.anomalies.len(),
        overdrafts = summary.total_overdrafts,
        subscribers_in_overdraft = summary.subscribers_in_overdraft,
        total_overdraft_amount = %summary.total_overdraft_amount,
        "Analysis complete"
    );

    let mut output = std::io::stdout();
    if let Err(e) = report.write_csv(args.output, &mut output) {
        error!(error = %e, "Failed to write report");
        process::exit(1);
    }
}
