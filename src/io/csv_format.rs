//! CSV output for analysis results
//!
//! This module centralizes all CSV format concerns for the analyzer's outputs:
//! - Balanced transaction records
//! - Final subscriber balances
//! - Overdraft alerts
//! - Anomalies
//! - Balance trends
//! - Run statistics
//! - Subscriber behaviour profiles
//!
//! Every writer emits a header row even when there is nothing to write. Money
//! values are rounded to two decimal places; timestamps are written with
//! millisecond precision. Row types with closed vocabularies are serialized
//! through serde so the enums' own names land in the CSV.

use crate::types::{
    Alert, AnalyzerError, Anomaly, BalanceStability, BalanceTrend, BalancedRecord, Frequency,
    Severity, SubscriberBehaviour, SubscriberId, SummaryStats, TransactionType,
};
use chrono::NaiveDateTime;
use csv::{Writer, WriterBuilder};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Alert row as written to CSV
#[derive(Debug, Serialize)]
struct AlertRow<'a> {
    subscriber_id: &'a str,
    timestamp: String,
    balance: String,
    transaction_amount: String,
    transaction_type: TransactionType,
    severity: Severity,
    message: String,
}

/// Subscriber behaviour row as written to CSV
#[derive(Debug, Serialize)]
struct BehaviourRow<'a> {
    subscriber_id: &'a str,
    total_transactions: usize,
    total_volume: String,
    average_amount: String,
    frequency: Frequency,
    preferred_type: TransactionType,
    risk_score: String,
    balance_stability: BalanceStability,
}

/// One `metric,value` pair of the run statistics view
#[derive(Debug, Serialize)]
struct MetricRow {
    metric: String,
    value: String,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn money(value: Decimal) -> String {
    let value = value.round_dp(2);
    // Negated zero amounts must not print as -0.00
    if value.is_zero() {
        return "0.00".to_string();
    }
    format!("{:.2}", value)
}

fn timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn write_header<W: Write>(writer: &mut Writer<W>, header: &[&str]) -> Result<(), AnalyzerError> {
    writer
        .write_record(header)
        .map_err(|e| AnalyzerError::output(format!("Failed to write CSV header: {}", e)))
}

// Headers are written explicitly so empty views still carry them
fn serializing_writer(output: &mut dyn Write) -> Writer<&mut dyn Write> {
    WriterBuilder::new().has_headers(false).from_writer(output)
}

fn finish<W: Write>(mut writer: Writer<W>) -> Result<(), AnalyzerError> {
    writer
        .flush()
        .map_err(|e| AnalyzerError::output(format!("Failed to flush output: {}", e)))
}

/// Write balanced transaction records
///
/// Records are written in the order given; the balance engine already orders
/// them by subscriber and timestamp.
///
/// # Arguments
///
/// * `records` - Records annotated by the balance engine
/// * `output` - Writer receiving the CSV text
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(AnalyzerError::OutputError)` if a write error occurred
pub fn write_records_csv(
    records: &[BalancedRecord],
    output: &mut dyn Write,
) -> Result<(), AnalyzerError> {
    let mut writer = Writer::from_writer(output);

    write_header(
        &mut writer,
        &[
            "timestamp",
            "request_id",
            "message_id",
            "subscriber_id",
            "transaction_type",
            "operation",
            "status",
            "amount",
            "balance_change",
            "running_balance",
            "is_overdraft",
            "source_file",
            "folder_path",
        ],
    )?;

    for balanced in records {
        let record = &balanced.record;
        let (source_file, folder_path) = match &record.provenance {
            Some(provenance) => (
                provenance.source_file.as_str(),
                provenance.folder_path.as_str(),
            ),
            None => ("", ""),
        };

        writer
            .write_record(&[
                timestamp(&record.timestamp),
                record.request_id.clone(),
                record.message_id.clone(),
                record.subscriber_id.clone(),
                record.transaction_type.as_str().to_string(),
                record.operation.as_str().to_string(),
                record.status.as_str().to_string(),
                money(record.amount),
                money(balanced.balance_change),
                money(balanced.running_balance),
                balanced.is_overdraft.to_string(),
                source_file.to_string(),
                folder_path.to_string(),
            ])
            .map_err(|e| AnalyzerError::output(format!("Failed to write record: {}", e)))?;
    }

    finish(writer)
}

/// Write final per-subscriber balances, sorted by subscriber id
pub fn write_balances_csv(
    balances: &BTreeMap<SubscriberId, Decimal>,
    output: &mut dyn Write,
) -> Result<(), AnalyzerError> {
    let mut writer = Writer::from_writer(output);
    write_header(&mut writer, &["subscriber_id", "balance"])?;

    for (subscriber_id, balance) in balances {
        writer
            .write_record(&[subscriber_id.clone(), money(*balance)])
            .map_err(|e| AnalyzerError::output(format!("Failed to write balance: {}", e)))?;
    }

    finish(writer)
}

/// Write overdraft alerts in the order they were raised
pub fn write_alerts_csv(alerts: &[Alert], output: &mut dyn Write) -> Result<(), AnalyzerError> {
    let mut writer = serializing_writer(output);
    write_header(
        &mut writer,
        &[
            "subscriber_id",
            "timestamp",
            "balance",
            "transaction_amount",
            "transaction_type",
            "severity",
            "message",
        ],
    )?;

    for alert in alerts {
        writer
            .serialize(AlertRow {
                subscriber_id: &alert.subscriber_id,
                timestamp: timestamp(&alert.timestamp),
                balance: money(alert.balance),
                transaction_amount: money(alert.transaction_amount),
                transaction_type: alert.transaction_type,
                severity: alert.severity,
                message: alert.message(),
            })
            .map_err(|e| AnalyzerError::output(format!("Failed to write alert: {}", e)))?;
    }

    finish(writer)
}

/// Write anomalies in detection order
pub fn write_anomalies_csv(
    anomalies: &[Anomaly],
    output: &mut dyn Write,
) -> Result<(), AnalyzerError> {
    let mut writer = Writer::from_writer(output);
    write_header(
        &mut writer,
        &["type", "subscriber_id", "timestamp", "description"],
    )?;

    for anomaly in anomalies {
        writer
            .write_record(&[
                anomaly.kind().to_string(),
                anomaly.subscriber_id().to_string(),
                timestamp(&anomaly.timestamp()),
                anomaly.description(),
            ])
            .map_err(|e| AnalyzerError::output(format!("Failed to write anomaly: {}", e)))?;
    }

    finish(writer)
}

/// Write per-subscriber balance trends
pub fn write_trends_csv(
    trends: &[BalanceTrend],
    output: &mut dyn Write,
) -> Result<(), AnalyzerError> {
    let mut writer = Writer::from_writer(output);
    write_header(
        &mut writer,
        &[
            "subscriber_id",
            "initial_balance",
            "final_balance",
            "max_balance",
            "min_balance",
            "volatility",
            "direction",
            "transaction_count",
            "days_active",
        ],
    )?;

    for trend in trends {
        writer
            .write_record(&[
                trend.subscriber_id.clone(),
                money(trend.initial_balance),
                money(trend.final_balance),
                money(trend.max_balance),
                money(trend.min_balance),
                format!("{:.2}", trend.volatility),
                trend.direction.as_str().to_string(),
                trend.transaction_count.to_string(),
                trend.days_active.to_string(),
            ])
            .map_err(|e| AnalyzerError::output(format!("Failed to write trend: {}", e)))?;
    }

    finish(writer)
}

/// Write run statistics as `metric,value` rows
///
/// Counts per transaction type and per operation follow the fixed metrics,
/// prefixed with `type:` and `operation:`. An empty run writes the header
/// only.
pub fn write_summary_csv(
    stats: Option<&SummaryStats>,
    output: &mut dyn Write,
) -> Result<(), AnalyzerError> {
    let mut writer = serializing_writer(output);
    write_header(&mut writer, &["metric", "value"])?;

    let Some(stats) = stats else {
        return finish(writer);
    };

    let mut rows = vec![
        ("total_transactions".to_string(), stats.total_transactions.to_string()),
        ("first_timestamp".to_string(), timestamp(&stats.first_timestamp)),
        ("last_timestamp".to_string(), timestamp(&stats.last_timestamp)),
        ("unique_subscribers".to_string(), stats.unique_subscribers.to_string()),
        ("total_volume".to_string(), money(stats.total_volume)),
        ("average_amount".to_string(), money(stats.average_amount)),
        ("median_amount".to_string(), money(stats.median_amount)),
        ("largest_amount".to_string(), money(stats.largest_amount)),
        ("smallest_amount".to_string(), money(stats.smallest_amount)),
        (
            "subscribers_with_overdrafts".to_string(),
            stats.subscribers_with_overdrafts.to_string(),
        ),
        ("overdraft_instances".to_string(), stats.overdraft_instances.to_string()),
        (
            "average_running_balance".to_string(),
            money(stats.average_running_balance),
        ),
        ("success_rate".to_string(), format!("{:.2}", stats.success_rate)),
        (
            "average_duration_ms".to_string(),
            format!("{:.2}", stats.average_duration_ms),
        ),
        ("source_files".to_string(), stats.source_files.len().to_string()),
        ("folders".to_string(), stats.folders.len().to_string()),
    ];
    rows.extend(
        stats
            .by_type
            .iter()
            .map(|(name, count)| (format!("type:{}", name), count.to_string())),
    );
    rows.extend(
        stats
            .by_operation
            .iter()
            .map(|(name, count)| (format!("operation:{}", name), count.to_string())),
    );

    for (metric, value) in rows {
        writer
            .serialize(MetricRow { metric, value })
            .map_err(|e| AnalyzerError::output(format!("Failed to write statistic: {}", e)))?;
    }

    finish(writer)
}

/// Write subscriber behaviour profiles
pub fn write_behaviour_csv(
    profiles: &[SubscriberBehaviour],
    output: &mut dyn Write,
) -> Result<(), AnalyzerError> {
    let mut writer = serializing_writer(output);
    write_header(
        &mut writer,
        &[
            "subscriber_id",
            "total_transactions",
            "total_volume",
            "average_amount",
            "frequency",
            "preferred_type",
            "risk_score",
            "balance_stability",
        ],
    )?;

    for profile in profiles {
        writer
            .serialize(BehaviourRow {
                subscriber_id: &profile.subscriber_id,
                total_transactions: profile.total_transactions,
                total_volume: money(profile.total_volume),
                average_amount: money(profile.average_amount),
                frequency: profile.frequency,
                preferred_type: profile.preferred_type,
                risk_score: format!("{:.2}", profile.risk_score),
                balance_stability: profile.balance_stability,
            })
            .map_err(|e| AnalyzerError::output(format!("Failed to write behaviour: {}", e)))?;
    }

    finish(writer)
}
