//! Parse and record statistics
//!
//! Counters the ingestion pipeline keeps while turning raw text into records.

use super::transaction::TransactionRecord;
use std::collections::HashSet;

/// Tally of what happened to each log entry during parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Entries produced by the splitter
    pub total_entries: usize,

    /// Entries that became records
    pub parsed: usize,

    /// Entries recognised as intentionally skipped balance syncs
    pub skip_messages: usize,

    /// Entries dropped because no timestamp could be parsed
    pub missing_timestamp: usize,

    /// Records whose dollar amount could not be parsed (amount set to 0)
    pub malformed_amounts: usize,

    /// Archive members that could not be extracted
    pub members_failed: usize,
}

impl ParseStats {
    /// Add another tally into this one
    pub fn merge(&mut self, other: &ParseStats) {
        self.total_entries += other.total_entries;
        self.parsed += other.parsed;
        self.skip_messages += other.skip_messages;
        self.missing_timestamp += other.missing_timestamp;
        self.malformed_amounts += other.malformed_amounts;
        self.members_failed += other.members_failed;
    }
}

/// Summary figures over a set of parsed records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStats {
    pub total: usize,
    /// Records with a non-zero amount
    pub with_amount: usize,
    /// Records whose text mentioned an overdraft
    pub overdraft_keyword: usize,
    pub unique_subscribers: usize,
    pub unique_request_ids: usize,
}

impl RecordStats {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let subscribers: HashSet<&str> = records.iter().map(|r| r.subscriber_id.as_str()).collect();
        let request_ids: HashSet<&str> = records.iter().map(|r| r.request_id.as_str()).collect();

        RecordStats {
            total: records.len(),
            with_amount: records.iter().filter(|r| !r.amount.is_zero()).count(),
            overdraft_keyword: records.iter().filter(|r| r.overdraft_keyword).count(),
            unique_subscribers: subscribers.len(),
            unique_request_ids: request_ids.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Status, TransactionType};
    use rust_decimal::Decimal;

    #[test]
    fn test_merge_adds_every_counter() {
        let mut total = ParseStats {
            total_entries: 3,
            parsed: 2,
            skip_messages: 1,
            missing_timestamp: 0,
            malformed_amounts: 1,
            members_failed: 0,
        };
        total.merge(&ParseStats {
            total_entries: 4,
            parsed: 1,
            skip_messages: 0,
            missing_timestamp: 3,
            malformed_amounts: 0,
            members_failed: 2,
        });

        assert_eq!(total.total_entries, 7);
        assert_eq!(total.parsed, 3);
        assert_eq!(total.skip_messages, 1);
        assert_eq!(total.missing_timestamp, 3);
        assert_eq!(total.malformed_amounts, 1);
        assert_eq!(total.members_failed, 2);
    }

    #[test]
    fn test_record_stats_counts() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut first = TransactionRecord::new(
            ts,
            "sub_1",
            TransactionType::Credit,
            Decimal::new(10, 0),
            Status::Success,
        );
        first.request_id = "req-1".to_string();
        first.overdraft_keyword = true;
        let mut second =
            TransactionRecord::new(ts, "sub_1", TransactionType::Unknown, Decimal::ZERO, Status::Unknown);
        second.request_id = "req-2".to_string();
        let mut third =
            TransactionRecord::new(ts, "sub_2", TransactionType::Debit, Decimal::ONE, Status::Success);
        third.request_id = "req-2".to_string();

        let stats = RecordStats::from_records(&[first, second, third]);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.with_amount, 2);
        assert_eq!(stats.overdraft_keyword, 1);
        assert_eq!(stats.unique_subscribers, 2);
        assert_eq!(stats.unique_request_ids, 2);
    }
}
