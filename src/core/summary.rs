//! Overdraft summaries, balance trends and run statistics
//!
//! Pure functions over balanced records. Overdraft summaries and trends skip
//! the `unknown` subscriber, whose records carry no balance; run statistics
//! count every record.

use crate::core::anomaly::{percentile, population_std};
use crate::types::{
    BalanceTrend, BalancedRecord, OverdraftSummary, Status, SubscriberOverdraft, SummaryStats,
    TrendDirection,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Sum that clamps at the `Decimal` bounds instead of overflowing
pub(crate) fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Summarise every overdraft in a record set
///
/// # Arguments
///
/// * `records` - Balanced records, as produced by the balance engine
///
/// # Returns
///
/// Counts of overdraft records and subscribers, the total and mean depth of
/// the negative balances among them, and a per-subscriber breakdown. The
/// breakdown's `current_balance` is the subscriber's latest running balance
/// across all their records, overdrawn or not.
pub fn overdraft_summary(records: &[BalancedRecord]) -> OverdraftSummary {
    let tracked = || {
        records
            .iter()
            .filter(|r| r.record.is_tracked())
    };

    let mut latest: HashMap<&str, &BalancedRecord> = HashMap::new();
    for record in tracked() {
        let entry = latest.entry(record.record.subscriber_id.as_str()).or_insert(record);
        if record.record.timestamp >= entry.record.timestamp {
            *entry = record;
        }
    }

    let mut summary = OverdraftSummary::default();
    let mut negative_count = 0usize;
    let mut negative_sum = Decimal::ZERO;

    for record in tracked().filter(|r| r.is_overdraft) {
        summary.total_overdrafts += 1;
        if record.running_balance < Decimal::ZERO {
            negative_count += 1;
            negative_sum = negative_sum.saturating_add(record.running_balance);
        }

        let subscriber_id = record.record.subscriber_id.as_str();
        let current_balance = latest
            .get(subscriber_id)
            .map(|r| r.running_balance)
            .unwrap_or(record.running_balance);
        let entry = summary
            .by_subscriber
            .entry(subscriber_id.to_string())
            .or_insert(SubscriberOverdraft {
                overdraft_count: 0,
                worst_balance: record.running_balance,
                current_balance,
            });
        entry.overdraft_count += 1;
        entry.worst_balance = entry.worst_balance.min(record.running_balance);
    }

    summary.subscribers_in_overdraft = summary.by_subscriber.len();
    summary.total_overdraft_amount = negative_sum.abs();
    if negative_count > 0 {
        summary.average_overdraft_amount = (negative_sum / Decimal::from(negative_count)).abs();
    }

    summary
}

/// Balance trend of every subscriber with at least two records
///
/// # Returns
///
/// One trend per subscriber, sorted by subscriber id
pub fn balance_trends(records: &[BalancedRecord]) -> Vec<BalanceTrend> {
    let mut by_subscriber: BTreeMap<&str, Vec<&BalancedRecord>> = BTreeMap::new();
    for record in records {
        if !record.record.is_tracked() {
            continue;
        }
        by_subscriber
            .entry(record.record.subscriber_id.as_str())
            .or_default()
            .push(record);
    }

    by_subscriber
        .into_iter()
        .filter(|(_, history)| history.len() >= 2)
        .filter_map(|(subscriber_id, mut history)| {
            history.sort_by_key(|r| r.record.timestamp);

            let balances: Vec<Decimal> = history.iter().map(|r| r.running_balance).collect();
            let first = history.first()?;
            let last = history.last()?;
            let initial_balance = first.running_balance;
            let final_balance = last.running_balance;

            Some(BalanceTrend {
                subscriber_id: subscriber_id.to_string(),
                initial_balance,
                final_balance,
                max_balance: balances.iter().copied().max()?,
                min_balance: balances.iter().copied().min()?,
                volatility: population_std(&balances)?,
                direction: if final_balance > initial_balance {
                    TrendDirection::Increasing
                } else {
                    TrendDirection::Decreasing
                },
                transaction_count: history.len(),
                days_active: (last.record.timestamp - first.record.timestamp).num_days(),
            })
        })
        .collect()
}

/// Statistics over every record of a run
///
/// # Returns
///
/// `None` for an empty record set
pub fn summary_stats(records: &[BalancedRecord]) -> Option<SummaryStats> {
    let first_timestamp = records.iter().map(|r| r.record.timestamp).min()?;
    let last_timestamp = records.iter().map(|r| r.record.timestamp).max()?;
    let count = Decimal::from(records.len());
    let n = records.len() as f64;

    let amounts: Vec<Decimal> = records.iter().map(|r| r.record.amount).collect();
    let total_volume = saturating_sum(amounts.iter().copied());
    let balance_total = saturating_sum(records.iter().map(|r| r.running_balance));

    let mut by_type = BTreeMap::new();
    let mut by_operation = BTreeMap::new();
    for record in records {
        *by_type.entry(record.record.transaction_type.as_str()).or_insert(0) += 1;
        *by_operation.entry(record.record.operation.as_str()).or_insert(0) += 1;
    }

    let subscribers: HashSet<&str> = records
        .iter()
        .map(|r| r.record.subscriber_id.as_str())
        .collect();
    let overdrawn: HashSet<&str> = records
        .iter()
        .filter(|r| r.is_overdraft)
        .map(|r| r.record.subscriber_id.as_str())
        .collect();
    let successes = records
        .iter()
        .filter(|r| r.record.status == Status::Success)
        .count();

    let (source_files, folders): (BTreeSet<String>, BTreeSet<String>) = records
        .iter()
        .filter_map(|r| r.record.provenance.as_ref())
        .map(|p| (p.source_file.clone(), p.folder_path.clone()))
        .unzip();

    Some(SummaryStats {
        total_transactions: records.len(),
        first_timestamp,
        last_timestamp,
        unique_subscribers: subscribers.len(),
        total_volume,
        average_amount: total_volume / count,
        median_amount: percentile(&amounts, 50)?,
        largest_amount: amounts.iter().copied().max()?,
        smallest_amount: amounts.iter().copied().min()?,
        by_type,
        by_operation,
        subscribers_with_overdrafts: overdrawn.len(),
        overdraft_instances: records.iter().filter(|r| r.is_overdraft).count(),
        average_running_balance: balance_total / count,
        success_rate: successes as f64 / n * 100.0,
        average_duration_ms: records.iter().map(|r| r.record.duration_ms).sum::<f64>() / n,
        source_files,
        folders,
    })
}
