//! Subscriber behaviour profiles
//!
//! Each tracked subscriber gets a profile built from their own records only:
//! volume, how often they transact, their usual transaction type, a 0-100
//! risk score and a rating of how steady their running balance is.
//!
//! # Risk score
//!
//! ```text
//! overdraft rate × 40
//! + min(amount coefficient of variation × 30, 30)
//! + failed rate × 30
//! ```
//!
//! capped at 100. Only `failed` counts as a failure here; `error` does not.

use crate::core::anomaly::sample_std;
use crate::core::summary::saturating_sum;
use crate::types::{
    BalanceStability, BalancedRecord, Frequency, Status, SubscriberBehaviour, TransactionType,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

const OVERDRAFT_WEIGHT: f64 = 40.0;
const VARIATION_WEIGHT: f64 = 30.0;
const VARIATION_CAP: f64 = 30.0;
const FAILURE_WEIGHT: f64 = 30.0;
const MAX_RISK: f64 = 100.0;

const STABLE_BELOW: f64 = 0.2;
const MODERATE_BELOW: f64 = 0.5;

/// Behaviour profile of every tracked subscriber, sorted by subscriber id
pub fn subscriber_behaviour(records: &[BalancedRecord]) -> Vec<SubscriberBehaviour> {
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
        .filter_map(|(subscriber_id, history)| {
            let first = history.iter().map(|r| r.record.timestamp).min()?;
            let last = history.iter().map(|r| r.record.timestamp).max()?;
            let n = history.len() as f64;

            let amounts: Vec<Decimal> = history.iter().map(|r| r.record.amount).collect();
            let balances: Vec<Decimal> = history.iter().map(|r| r.running_balance).collect();
            let total_volume = saturating_sum(amounts.iter().copied());

            let overdrafts = history.iter().filter(|r| r.is_overdraft).count();
            let failures = history
                .iter()
                .filter(|r| r.record.status == Status::Failed)
                .count();

            Some(SubscriberBehaviour {
                subscriber_id: subscriber_id.to_string(),
                total_transactions: history.len(),
                total_volume,
                average_amount: total_volume / Decimal::from(history.len()),
                frequency: frequency(history.len(), (last - first).num_days()),
                preferred_type: preferred_type(&history),
                risk_score: risk_score(
                    overdrafts as f64 / n,
                    coefficient_of_variation(&amounts),
                    failures as f64 / n,
                ),
                balance_stability: balance_stability(&balances),
            })
        })
        .collect()
}

/// Classify how often a subscriber transacts
///
/// # Arguments
///
/// * `transactions` - Number of records
/// * `span_days` - Whole days between the first and last record
pub fn frequency(transactions: usize, span_days: i64) -> Frequency {
    if transactions < 2 {
        return Frequency::InsufficientData;
    }
    if span_days <= 0 {
        return Frequency::SameDay;
    }

    let per_day = transactions as f64 / span_days as f64;
    if per_day >= 1.0 {
        Frequency::Daily
    } else if per_day >= 0.2 {
        Frequency::Weekly
    } else {
        Frequency::Monthly
    }
}

/// Combine the three risk factors into a 0-100 score
///
/// # Arguments
///
/// * `overdraft_rate` - Share of records in overdraft, 0 to 1
/// * `amount_variation` - Coefficient of variation of the amounts, if defined
/// * `failure_rate` - Share of failed records, 0 to 1
pub fn risk_score(overdraft_rate: f64, amount_variation: Option<f64>, failure_rate: f64) -> f64 {
    let mut score = overdraft_rate * OVERDRAFT_WEIGHT;
    if let Some(variation) = amount_variation {
        score += (variation * VARIATION_WEIGHT).min(VARIATION_CAP);
    }
    score += failure_rate * FAILURE_WEIGHT;

    score.min(MAX_RISK)
}

/// Rate a running-balance series by its coefficient of variation
///
/// The spread is the sample standard deviation; the mean is taken in
/// absolute value so overdrawn subscribers are rated the same way.
pub fn balance_stability(balances: &[Decimal]) -> BalanceStability {
    if balances.len() < 3 {
        return BalanceStability::Unknown;
    }
    let Some(std) = sample_std(balances) else {
        return BalanceStability::Unknown;
    };
    let mean = mean(balances).abs();
    if mean == 0.0 {
        return BalanceStability::Unknown;
    }

    let variation = std / mean;
    if variation < STABLE_BELOW {
        BalanceStability::Stable
    } else if variation < MODERATE_BELOW {
        BalanceStability::Moderate
    } else {
        BalanceStability::Volatile
    }
}

// Undefined for fewer than two amounts or a non-positive mean
fn coefficient_of_variation(amounts: &[Decimal]) -> Option<f64> {
    let mean = mean(amounts);
    if mean <= 0.0 {
        return None;
    }
    Some(sample_std(amounts)? / mean)
}

fn mean(values: &[Decimal]) -> f64 {
    let floats: Vec<f64> = values.iter().filter_map(|v| v.to_f64()).collect();
    if floats.is_empty() {
        return 0.0;
    }
    floats.iter().sum::<f64>() / floats.len() as f64
}

fn preferred_type(history: &[&BalancedRecord]) -> TransactionType {
    let mut counts: HashMap<TransactionType, usize> = HashMap::new();
    for record in history {
        *counts.entry(record.record.transaction_type).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(type_a, count_a), (type_b, count_b)| {
            count_a
                .cmp(count_b)
                .then_with(|| type_b.as_str().cmp(type_a.as_str()))
        })
        .map(|(transaction_type, _)| transaction_type)
        .unwrap_or(TransactionType::Unknown)
}
