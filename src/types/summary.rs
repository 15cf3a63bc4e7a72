//! Derived views over balanced records
//!
//! Overdraft summaries, balance trends, whole-run statistics and subscriber
//! behaviour profiles are computed after the balance engine has annotated a
//! record set. They hold no state of their own.

use super::transaction::{SubscriberId, TransactionType};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Overdraft figures for one subscriber
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberOverdraft {
    /// Records of this subscriber flagged as overdraft
    pub overdraft_count: usize,

    /// Lowest running balance among those records
    pub worst_balance: Decimal,

    /// Running balance after the subscriber's last record
    pub current_balance: Decimal,
}

/// Overdraft situation across a whole record set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverdraftSummary {
    pub total_overdrafts: usize,

    pub subscribers_in_overdraft: usize,

    /// Sum of the absolute negative running balances of overdraft records
    pub total_overdraft_amount: Decimal,

    /// Mean absolute negative running balance of overdraft records
    pub average_overdraft_amount: Decimal,

    pub by_subscriber: BTreeMap<SubscriberId, SubscriberOverdraft>,
}

/// Whether a subscriber ended above where they started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
        }
    }
}

/// Running-balance trend of one subscriber
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceTrend {
    pub subscriber_id: SubscriberId,
    pub initial_balance: Decimal,
    pub final_balance: Decimal,
    pub max_balance: Decimal,
    pub min_balance: Decimal,

    /// Population standard deviation of the running balances
    pub volatility: f64,

    /// `Increasing` only when the final balance is strictly above the initial one
    pub direction: TrendDirection,

    pub transaction_count: usize,

    /// Whole days between the first and last record
    pub days_active: i64,
}

/// Whole-run statistics over every balanced record
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_transactions: usize,
    pub first_timestamp: NaiveDateTime,
    pub last_timestamp: NaiveDateTime,

    /// Distinct subscriber ids, `unknown` included
    pub unique_subscribers: usize,

    pub total_volume: Decimal,
    pub average_amount: Decimal,
    pub median_amount: Decimal,
    pub largest_amount: Decimal,
    pub smallest_amount: Decimal,

    /// Record count per transaction type
    pub by_type: BTreeMap<&'static str, usize>,

    /// Record count per operation
    pub by_operation: BTreeMap<&'static str, usize>,

    pub subscribers_with_overdrafts: usize,
    pub overdraft_instances: usize,
    pub average_running_balance: Decimal,

    /// Percentage of records with status `success`
    pub success_rate: f64,

    pub average_duration_ms: f64,

    /// Archive members records were drawn from
    pub source_files: BTreeSet<String>,

    pub folders: BTreeSet<String>,
}

/// How often a subscriber transacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Fewer than two records
    InsufficientData,
    /// All records on the same day
    SameDay,
    /// At least one record per day
    Daily,
    /// At least one record every five days
    Weekly,
    Monthly,
}

/// Spread of a subscriber's running balance relative to its mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStability {
    Stable,
    Moderate,
    Volatile,
    /// Fewer than three records, or a zero mean balance
    Unknown,
}

/// Behaviour profile of one tracked subscriber
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberBehaviour {
    pub subscriber_id: SubscriberId,
    pub total_transactions: usize,
    pub total_volume: Decimal,
    pub average_amount: Decimal,
    pub frequency: Frequency,

    /// Most common transaction type; ties go to the alphabetically first
    pub preferred_type: TransactionType,

    /// 0 to 100, higher is riskier
    pub risk_score: f64,

    pub balance_stability: BalanceStability,
}
