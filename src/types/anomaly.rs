//! Anomaly types produced by the anomaly detector
//!
//! Anomalies are computed fresh on every analysis run and never retained.

use super::transaction::SubscriberId;
use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;

/// A statistically unusual pattern in one subscriber's history
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// Amount above the subscriber's own high-percentile amount
    LargeTransaction {
        subscriber_id: SubscriberId,
        timestamp: NaiveDateTime,
        amount: Decimal,
        /// Percentile amount the transaction exceeded
        threshold: Decimal,
    },

    /// Transactions arriving closer together than the burst window
    RapidTransactions {
        subscriber_id: SubscriberId,
        /// Timestamp of the first record that followed its predecessor too closely
        timestamp: NaiveDateTime,
        /// Number of consecutive gaps under the window
        count: usize,
        /// Burst window the gaps were measured against
        window: Duration,
    },

    /// Consecutive running-balance difference far outside the usual spread
    BalanceSwing {
        subscriber_id: SubscriberId,
        timestamp: NaiveDateTime,
        change: Decimal,
    },
}

impl Anomaly {
    pub fn kind(&self) -> &'static str {
        match self {
            Anomaly::LargeTransaction { .. } => "large_transaction",
            Anomaly::RapidTransactions { .. } => "rapid_transactions",
            Anomaly::BalanceSwing { .. } => "balance_swing",
        }
    }

    pub fn subscriber_id(&self) -> &str {
        match self {
            Anomaly::LargeTransaction { subscriber_id, .. }
            | Anomaly::RapidTransactions { subscriber_id, .. }
            | Anomaly::BalanceSwing { subscriber_id, .. } => subscriber_id,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Anomaly::LargeTransaction { timestamp, .. }
            | Anomaly::RapidTransactions { timestamp, .. }
            | Anomaly::BalanceSwing { timestamp, .. } => *timestamp,
        }
    }

    /// Human-readable description of the anomaly
    pub fn description(&self) -> String {
        match self {
            Anomaly::LargeTransaction { amount, .. } => {
                format!("Unusually large transaction: ${:.2}", amount)
            }
            Anomaly::RapidTransactions { count, window, .. } => {
                format!("{} transactions within {}", count, describe_window(*window))
            }
            Anomaly::BalanceSwing { change, .. } => {
                format!("Large balance swing: ${:.2}", change)
            }
        }
    }
}

fn describe_window(window: Duration) -> String {
    let seconds = window.num_seconds();
    match (seconds % 60, seconds / 60) {
        (0, 1) => "1 minute".to_string(),
        (0, minutes) => format!("{} minutes", minutes),
        _ if seconds == 1 => "1 second".to_string(),
        _ => format!("{} seconds", seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ts() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[rstest]
    #[case::large(
        Anomaly::LargeTransaction { subscriber_id: "sub_a".into(), timestamp: ts(), amount: Decimal::new(90000, 2), threshold: Decimal::new(500, 0) },
        "large_transaction",
        "Unusually large transaction: $900.00"
    )]
    #[case::rapid(
        Anomaly::RapidTransactions { subscriber_id: "sub_a".into(), timestamp: ts(), count: 3, window: Duration::minutes(5) },
        "rapid_transactions",
        "3 transactions within 5 minutes"
    )]
    #[case::rapid_seconds(
        Anomaly::RapidTransactions { subscriber_id: "sub_a".into(), timestamp: ts(), count: 2, window: Duration::seconds(90) },
        "rapid_transactions",
        "2 transactions within 90 seconds"
    )]
    #[case::rapid_one_minute(
        Anomaly::RapidTransactions { subscriber_id: "sub_a".into(), timestamp: ts(), count: 4, window: Duration::minutes(1) },
        "rapid_transactions",
        "4 transactions within 1 minute"
    )]
    #[case::swing(
        Anomaly::BalanceSwing { subscriber_id: "sub_a".into(), timestamp: ts(), change: Decimal::new(-1250, 1) },
        "balance_swing",
        "Large balance swing: $-125.00"
    )]
    fn test_anomaly_kind_and_description(
        #[case] anomaly: Anomaly,
        #[case] kind: &str,
        #[case] description: &str,
    ) {
        assert_eq!(anomaly.kind(), kind);
        assert_eq!(anomaly.description(), description);
        assert_eq!(anomaly.subscriber_id(), "sub_a");
        assert_eq!(anomaly.timestamp(), ts());
    }
}
