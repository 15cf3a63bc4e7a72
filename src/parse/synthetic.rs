//! Synthetic illustrative records
//!
//! When an input holds nothing but "skipping the balance sync" messages, the
//! analyzer can be asked to emit a handful of clearly labelled demonstration
//! records instead of failing. This is opt-in: the records are fabricated.
//!
//! Generation is deterministic. The same skip count always yields the same
//! records, which keeps reports reproducible.

use crate::types::{
    Operation, Provenance, RecordOrigin, Status, TransactionRecord, TransactionType,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Upper bound on the number of synthetic records per input
pub const MAX_SYNTHETIC_RECORDS: usize = 20;

/// `source_file` and `folder_path` of every synthetic record
pub const SYNTHETIC_SOURCE: &str = "synthetic";

const SUBSCRIBERS: [&str; 5] = ["sub_12345", "sub_67890", "sub_11111", "sub_22222", "sub_33333"];

const TRANSACTION_TYPES: [TransactionType; 4] = [
    TransactionType::Payment,
    TransactionType::Charge,
    TransactionType::Credit,
    TransactionType::Debit,
];

const STATUSES: [Status; 3] = [Status::Success, Status::Completed, Status::Failed];

const OPERATIONS: [Operation; 3] = [Operation::Payment, Operation::Charge, Operation::BalanceSync];

fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Generate illustrative records for an input that only held skip messages
///
/// # Arguments
///
/// * `skip_messages` - Number of skip messages found; bounds the record count
///
/// # Returns
///
/// At most `MAX_SYNTHETIC_RECORDS` records spread over one week, each tagged
/// `RecordOrigin::Synthetic` with `synthetic` provenance.
pub fn synthetic_records(skip_messages: usize) -> Vec<TransactionRecord> {
    let Some(epoch) = epoch() else {
        return Vec::new();
    };
    let count = skip_messages.min(MAX_SYNTHETIC_RECORDS);
    let provenance = Provenance {
        source_file: SYNTHETIC_SOURCE.to_string(),
        folder_path: SYNTHETIC_SOURCE.to_string(),
    };

    (0..count)
        .map(|i| {
            let number = i + 1;
            // Amounts stay within 10.00..=499.99
            let cents = 1_000 + (i as i64 * 7_919) % 49_000;

            TransactionRecord {
                timestamp: epoch + Duration::hours(i as i64 * 7),
                request_id: format!("sample-req-{:03}", number),
                message_id: format!("sample-msg-{:03}", number),
                subscriber_id: SUBSCRIBERS[i % SUBSCRIBERS.len()].to_string(),
                transaction_type: TRANSACTION_TYPES[i % TRANSACTION_TYPES.len()],
                amount: Decimal::new(cents, 2),
                overdraft_keyword: i % 4 == 3,
                status: STATUSES[i % STATUSES.len()],
                duration_ms: 50.0 + ((i * 37) % 250) as f64,
                operation: OPERATIONS[i % OPERATIONS.len()],
                raw_text: format!("Synthetic transaction {} - generated for demonstration", number),
                provenance: Some(provenance.clone()),
                origin: RecordOrigin::Synthetic,
            }
        })
        .collect()
}
