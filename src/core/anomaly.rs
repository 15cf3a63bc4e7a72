//! Anomaly detection
//!
//! This module provides the `AnomalyDetector`, which looks for statistically
//! unusual patterns in each subscriber's balanced history. Every check runs
//! against the subscriber's own records only; there is no cross-subscriber
//! baseline.
//!
//! Checks, in the order their findings are reported:
//! 1. Large transactions: amounts above the subscriber's percentile amount
//! 2. Rapid transactions: consecutive records closer than the burst window
//! 3. Balance swings: running-balance steps far outside the usual spread

use crate::config::AnomalyConfig;
use crate::types::{Anomaly, BalancedRecord};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// Stateless anomaly detector
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Run every check over every eligible subscriber
    ///
    /// # Arguments
    ///
    /// * `records` - Balanced records of any number of subscribers
    ///
    /// # Returns
    ///
    /// A flat list of anomalies grouped by subscriber id. Subscribers with
    /// fewer than `min_records` records, and the `unknown` subscriber, are
    /// never analysed.
    pub fn detect(&self, records: &[BalancedRecord]) -> Vec<Anomaly> {
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

        let mut anomalies = Vec::new();
        for (subscriber_id, mut history) in by_subscriber {
            if history.len() < self.config.min_records {
                debug!(
                    subscriber = subscriber_id,
                    records = history.len(),
                    "Too few records for anomaly detection"
                );
                continue;
            }
            history.sort_by_key(|r| r.record.timestamp);

            let before = anomalies.len();
            self.large_transactions(subscriber_id, &history, &mut anomalies);
            self.rapid_transactions(subscriber_id, &history, &mut anomalies);
            self.balance_swings(subscriber_id, &history, &mut anomalies);

            if anomalies.len() > before {
                debug!(
                    subscriber = subscriber_id,
                    anomalies = anomalies.len() - before,
                    "Anomalies found"
                );
            }
        }

        anomalies
    }

    fn large_transactions(
        &self,
        subscriber_id: &str,
        history: &[&BalancedRecord],
        anomalies: &mut Vec<Anomaly>,
    ) {
        let amounts: Vec<Decimal> = history.iter().map(|r| r.record.amount).collect();
        let Some(threshold) = percentile(&amounts, self.config.large_percentile) else {
            return;
        };

        for record in history {
            if record.record.amount > threshold {
                anomalies.push(Anomaly::LargeTransaction {
                    subscriber_id: subscriber_id.to_string(),
                    timestamp: record.record.timestamp,
                    amount: record.record.amount,
                    threshold,
                });
            }
        }
    }

    fn rapid_transactions(
        &self,
        subscriber_id: &str,
        history: &[&BalancedRecord],
        anomalies: &mut Vec<Anomaly>,
    ) {
        let mut first = None;
        let mut count = 0;

        for pair in history.windows(2) {
            let gap = pair[1].record.timestamp - pair[0].record.timestamp;
            if gap < self.config.rapid_window {
                count += 1;
                first.get_or_insert(pair[1].record.timestamp);
            }
        }

        if let Some(timestamp) = first {
            anomalies.push(Anomaly::RapidTransactions {
                subscriber_id: subscriber_id.to_string(),
                timestamp,
                count,
                window: self.config.rapid_window,
            });
        }
    }

    fn balance_swings(
        &self,
        subscriber_id: &str,
        history: &[&BalancedRecord],
        anomalies: &mut Vec<Anomaly>,
    ) {
        let diffs: Vec<Decimal> = history
            .windows(2)
            .map(|pair| pair[1].running_balance.saturating_sub(pair[0].running_balance))
            .collect();

        let Some(std) = population_std(&diffs) else {
            return;
        };
        // No variance, no swing
        if std == 0.0 {
            return;
        }

        let limit = self.config.swing_sigma * std;
        for (idx, diff) in diffs.iter().enumerate() {
            let magnitude = diff.abs().to_f64().unwrap_or(f64::MAX);
            if magnitude > limit {
                anomalies.push(Anomaly::BalanceSwing {
                    subscriber_id: subscriber_id.to_string(),
                    timestamp: history[idx + 1].record.timestamp,
                    change: *diff,
                });
            }
        }
    }
}

/// Percentile of a set of values, linearly interpolated between closest ranks
///
/// # Returns
///
/// `None` for an empty slice
pub fn percentile(values: &[Decimal], pct: u32) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort();

    let pct = Decimal::from(pct.min(100));
    let rank = pct * Decimal::from(sorted.len() - 1) / Decimal::ONE_HUNDRED;
    let lower = rank.floor();
    let fraction = rank - lower;
    let lower_idx = lower.to_usize()?;
    let upper_idx = (lower_idx + 1).min(sorted.len() - 1);

    Some(sorted[lower_idx] + (sorted[upper_idx] - sorted[lower_idx]) * fraction)
}

/// Population standard deviation, computed in `f64`
///
/// # Returns
///
/// `None` for an empty slice
pub fn population_std(values: &[Decimal]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let floats: Vec<f64> = values.iter().filter_map(|v| v.to_f64()).collect();
    let n = floats.len() as f64;
    let mean = floats.iter().sum::<f64>() / n;
    let variance = floats.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(variance.sqrt())
}

/// Sample standard deviation (n - 1 denominator), computed in `f64`
///
/// # Returns
///
/// `None` for fewer than two values
pub fn sample_std(values: &[Decimal]) -> Option<f64> {
    let floats: Vec<f64> = values.iter().filter_map(|v| v.to_f64()).collect();
    if floats.len() < 2 {
        return None;
    }

    let n = floats.len() as f64;
    let mean = floats.iter().sum::<f64>() / n;
    let variance = floats.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Status, TransactionRecord, TransactionType, UNKNOWN_SUBSCRIBER};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rstest::rstest;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn balanced(subscriber: &str, offset: Duration, amount: i64, running: i64) -> BalancedRecord {
        BalancedRecord {
            record: TransactionRecord::new(
                base() + offset,
                subscriber,
                TransactionType::Credit,
                Decimal::new(amount, 0),
                Status::Success,
            ),
            balance_change: Decimal::new(amount, 0),
            running_balance: Decimal::new(running, 0),
            is_overdraft: running < 0,
        }
    }

    /// Hourly records with the given amounts and running balances
    fn hourly(subscriber: &str, rows: &[(i64, i64)]) -> Vec<BalancedRecord> {
        rows.iter()
            .enumerate()
            .map(|(i, (amount, running))| {
                balanced(subscriber, Duration::hours(i as i64), *amount, *running)
            })
            .collect()
    }

    fn kinds(anomalies: &[Anomaly]) -> Vec<&'static str> {
        anomalies.iter().map(|a| a.kind()).collect()
    }

    #[rstest]
    #[case::single(&[7], 95, Decimal::new(7, 0))]
    #[case::median(&[1, 2, 3, 4, 5], 50, Decimal::new(3, 0))]
    #[case::interpolated(&[10, 20, 30, 40, 1000], 95, Decimal::new(8080, 1))]
    #[case::max(&[5, 1, 3], 100, Decimal::new(5, 0))]
    #[case::min(&[5, 1, 3], 0, Decimal::new(1, 0))]
    fn test_percentile(#[case] values: &[i64], #[case] pct: u32, #[case] expected: Decimal) {
        let values: Vec<Decimal> = values.iter().map(|v| Decimal::new(*v, 0)).collect();
        assert_eq!(percentile(&values, pct), Some(expected));
    }

    #[test]
    fn test_percentile_empty() {
        assert_eq!(percentile(&[], 95), None);
    }

    #[test]
    fn test_population_std() {
        let values: Vec<Decimal> = [2, 4, 4, 4, 5, 5, 7, 9].iter().map(|v| Decimal::new(*v, 0)).collect();
        assert_eq!(population_std(&values), Some(2.0));
        assert_eq!(population_std(&[]), None);
    }

    #[test]
    fn test_sample_std() {
        let values: Vec<Decimal> = [10, 20, 30].iter().map(|v| Decimal::new(*v, 0)).collect();

        assert_eq!(sample_std(&values), Some(10.0));
        assert_eq!(sample_std(&values[..1]), None);
        assert_eq!(sample_std(&[]), None);
    }

    #[test]
    fn test_identical_amounts_are_not_large() {
        let records = hourly("sub_1", &[(50, 50), (50, 100), (50, 150), (50, 200), (50, 250)]);

        let anomalies = AnomalyDetector::default().detect(&records);

        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_large_transaction_detected() {
        let records = hourly("sub_1", &[(10, 10), (20, 30), (30, 60), (40, 100), (1000, 1100)]);

        let anomalies = AnomalyDetector::default().detect(&records);

        let large: Vec<&Anomaly> = anomalies
            .iter()
            .filter(|a| a.kind() == "large_transaction")
            .collect();
        assert_eq!(large.len(), 1);
        match large[0] {
            Anomaly::LargeTransaction {
                amount, threshold, ..
            } => {
                assert_eq!(*amount, Decimal::new(1000, 0));
                assert_eq!(*threshold, Decimal::new(8080, 1));
            }
            other => panic!("Expected large transaction, got {:?}", other),
        }
    }

    #[test]
    fn test_too_few_records_are_skipped() {
        let records = hourly("sub_1", &[(10, 10), (20, 30), (30, 60), (5000, 5060)]);

        assert!(AnomalyDetector::default().detect(&records).is_empty());
    }

    #[test]
    fn test_rapid_transactions_reported_once() {
        let minutes = [0, 2, 4, 60, 61];
        let records: Vec<BalancedRecord> = minutes
            .iter()
            .enumerate()
            .map(|(i, m)| balanced("sub_1", Duration::minutes(*m), 10, 10 * (i as i64 + 1)))
            .collect();

        let anomalies = AnomalyDetector::default().detect(&records);

        assert_eq!(kinds(&anomalies), vec!["rapid_transactions"]);
        match &anomalies[0] {
            Anomaly::RapidTransactions {
                timestamp,
                count,
                window,
                ..
            } => {
                assert_eq!(*count, 3);
                assert_eq!(*window, Duration::minutes(5));
                assert_eq!(*timestamp, base() + Duration::minutes(2));
            }
            other => panic!("Expected rapid transactions, got {:?}", other),
        }
    }

    #[test]
    fn test_gap_of_exactly_window_is_not_rapid() {
        let records: Vec<BalancedRecord> = (0..5)
            .map(|i| balanced("sub_1", Duration::minutes(5 * i), 10, 10 * (i + 1)))
            .collect();

        assert!(AnomalyDetector::default().detect(&records).is_empty());
    }

    #[test]
    fn test_rapid_description_follows_configured_window() {
        let config = AnomalyConfig {
            rapid_window: Duration::minutes(10),
            ..AnomalyConfig::default()
        };
        let records: Vec<BalancedRecord> = (0..5)
            .map(|i| balanced("sub_1", Duration::minutes(5 * i), 10, 10 * (i + 1)))
            .collect();

        let anomalies = AnomalyDetector::new(config).detect(&records);

        assert_eq!(kinds(&anomalies), vec!["rapid_transactions"]);
        assert_eq!(anomalies[0].description(), "4 transactions within 10 minutes");
    }

    #[test]
    fn test_balance_swing_detected() {
        // Twelve steps of +1 and one step of +100
        let mut rows: Vec<(i64, i64)> = (1..=12).map(|i| (1, i)).collect();
        rows.push((1, 112));
        let records = hourly("sub_1", &rows);

        let anomalies = AnomalyDetector::default().detect(&records);

        let swings: Vec<&Anomaly> = anomalies
            .iter()
            .filter(|a| a.kind() == "balance_swing")
            .collect();
        assert_eq!(swings.len(), 1);
        match swings[0] {
            Anomaly::BalanceSwing {
                timestamp, change, ..
            } => {
                assert_eq!(*change, Decimal::new(100, 0));
                assert_eq!(*timestamp, base() + Duration::hours(12));
            }
            other => panic!("Expected balance swing, got {:?}", other),
        }
    }

    #[test]
    fn test_constant_steps_have_no_swing() {
        let records = hourly("sub_1", &[(5, 5), (5, 10), (5, 15), (5, 20), (5, 25), (5, 30)]);

        assert!(AnomalyDetector::default().detect(&records).is_empty());
    }

    #[test]
    fn test_unknown_subscriber_is_ignored() {
        let records = hourly(
            UNKNOWN_SUBSCRIBER,
            &[(10, 0), (20, 0), (30, 0), (40, 0), (1000, 0)],
        );

        assert!(AnomalyDetector::default().detect(&records).is_empty());
    }

    #[test]
    fn test_subscribers_are_analysed_independently() {
        let mut records = hourly("sub_b", &[(10, 10), (20, 30), (30, 60), (40, 100), (1000, 1100)]);
        records.extend(hourly("sub_a", &[(10, 10), (20, 30), (30, 60), (40, 100), (1000, 1100)]));

        let anomalies = AnomalyDetector::default().detect(&records);

        let subscribers: Vec<&str> = anomalies
            .iter()
            .filter(|a| a.kind() == "large_transaction")
            .map(|a| a.subscriber_id())
            .collect();
        assert_eq!(subscribers, vec!["sub_a", "sub_b"]);
    }

    #[test]
    fn test_custom_min_records() {
        let config = AnomalyConfig {
            min_records: 2,
            ..AnomalyConfig::default()
        };
        let records = hourly("sub_1", &[(10, 10), (500, 510)]);

        let anomalies = AnomalyDetector::new(config).detect(&records);

        assert_eq!(kinds(&anomalies), vec!["large_transaction"]);
    }
}
