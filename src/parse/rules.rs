//! Field extraction rule tables
//!
//! Each field is described by an ordered chain of patterns. The first pattern
//! that captures wins, so precedence is whatever order the chain lists. The
//! tables are plain data and can be tested on their own.

use crate::types::Operation;
use regex::Regex;
use std::sync::LazyLock;

/// Phrase marking an invocation that intentionally did nothing
pub const SKIP_PHRASE: &str = "skipping the balance sync";

/// Ordered patterns for one field
#[derive(Debug)]
pub struct RuleChain {
    field: &'static str,
    patterns: Vec<Regex>,
}

impl RuleChain {
    fn compile(field: &'static str, patterns: &[&str]) -> Self {
        RuleChain {
            field,
            patterns: patterns
                .iter()
                .map(|pattern| Regex::new(pattern).unwrap())
                .collect(),
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// First capture group of the first pattern that matches
    pub fn first_capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|captures| captures.get(1))
                .map(|capture| capture.as_str())
        })
    }

    /// Whether any pattern matches
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }
}

pub static TIMESTAMP: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::compile(
        "timestamp",
        &[r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z)"],
    )
});

pub static REQUEST_ID: LazyLock<RuleChain> =
    LazyLock::new(|| RuleChain::compile("request_id", &[r"RequestId: ([a-f0-9\-]+)"]));

pub static MESSAGE_ID: LazyLock<RuleChain> =
    LazyLock::new(|| RuleChain::compile("message_id", &[r"Processing message ([a-f0-9\-]+)"]));

// Explicit "subscriber id: x" first, then any bare sub_ token
pub static SUBSCRIBER: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::compile(
        "subscriber_id",
        &[
            r"(?i)subscriber[_\s]?[id]*[:\s]+([a-zA-Z0-9\-_]+)",
            r"(?i)(sub_[a-zA-Z0-9]+)",
        ],
    )
});

pub static TRANSACTION_TYPE: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::compile(
        "transaction_type",
        &[r"(?i)(credit|debit|payment|refund|charge)"],
    )
});

// Thousands separators are allowed and stripped before parsing
pub static AMOUNT: LazyLock<RuleChain> =
    LazyLock::new(|| RuleChain::compile("amount", &[r"\$(\d[\d,]*(?:\.\d+)?)"]));

pub static OVERDRAFT: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::compile(
        "overdraft",
        &[r"(?i)overdraft|negative balance|insufficient funds"],
    )
});

pub static STATUS: LazyLock<RuleChain> = LazyLock::new(|| {
    RuleChain::compile(
        "status",
        &[r"(?i)(success|failed|error|completed|successfully)"],
    )
});

pub static DURATION: LazyLock<RuleChain> =
    LazyLock::new(|| RuleChain::compile("duration_ms", &[r"Duration: ([\d.]+) ms"]));

/// Operation phrases, highest priority first
pub const OPERATION_RULES: [(&str, Operation); 5] = [
    ("create subscription", Operation::CreateSubscription),
    ("balance sync", Operation::BalanceSync),
    ("payment", Operation::Payment),
    ("refund", Operation::Refund),
    ("charge", Operation::Charge),
];

/// Classify the operation of an entry by the first phrase it contains
pub fn classify_operation(entry: &str) -> Operation {
    let lower = entry.to_lowercase();
    OPERATION_RULES
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, operation)| *operation)
        .unwrap_or(Operation::Unknown)
}

/// Whether an entry is an intentionally skipped balance sync
pub fn is_skip_message(entry: &str) -> bool {
    entry.to_lowercase().contains(SKIP_PHRASE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::explicit_id("Subscriber ID: abc-123 charged", Some("abc-123"))]
    #[case::underscore("subscriber_id: sub_9", Some("sub_9"))]
    #[case::bare_subscriber("subscriber sub_42", Some("sub_42"))]
    #[case::token_only("applying credit to SUB_x7 now", Some("SUB_x7"))]
    #[case::none("no identifiers here", None)]
    fn test_subscriber_chain(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(SUBSCRIBER.first_capture(text), expected);
    }

    #[test]
    fn test_explicit_subscriber_wins_over_token() {
        let text = "sub_first appears earlier but Subscriber: explicit wins";
        assert_eq!(SUBSCRIBER.first_capture(text), Some("explicit"));
    }

    #[rstest]
    #[case::plain("charged $5.00", Some("5.00"))]
    #[case::whole("charged $5", Some("5"))]
    #[case::thousands("credit of $1,250.75", Some("1,250.75"))]
    #[case::first_wins("$10.00 then $20.00", Some("10.00"))]
    #[case::no_dollar("amount 5.00", None)]
    fn test_amount_chain(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(AMOUNT.first_capture(text), expected);
    }

    #[rstest]
    #[case::create("Create Subscription with payment", Operation::CreateSubscription)]
    #[case::sync_over_payment("Balance sync after payment", Operation::BalanceSync)]
    #[case::payment_over_refund("payment refund", Operation::Payment)]
    #[case::refund("Refund issued", Operation::Refund)]
    #[case::charge("charge applied", Operation::Charge)]
    #[case::unknown("heartbeat", Operation::Unknown)]
    fn test_classify_operation(#[case] entry: &str, #[case] expected: Operation) {
        assert_eq!(classify_operation(entry), expected);
    }

    #[rstest]
    #[case::exact("Skipping the balance sync for sub_1", true)]
    #[case::upper("SKIPPING THE BALANCE SYNC", true)]
    #[case::other("performing the balance sync", false)]
    fn test_is_skip_message(#[case] entry: &str, #[case] expected: bool) {
        assert_eq!(is_skip_message(entry), expected);
    }

    #[rstest]
    #[case::overdraft("Overdraft on account", true)]
    #[case::negative("resulting in NEGATIVE BALANCE", true)]
    #[case::insufficient("insufficient funds", true)]
    #[case::none("balance fine", false)]
    fn test_overdraft_keyword(#[case] text: &str, #[case] expected: bool) {
        assert!(OVERDRAFT.is_match(text) == expected);
    }

    #[test]
    fn test_ids_and_timestamp() {
        let entry = "2024-01-05T10:00:00.123Z START RequestId: 9f8e-77aa Version: $LATEST\n\
                     Processing message 0a1b-2c3d\n\
                     REPORT RequestId: 9f8e-77aa Duration: 152.34 ms";

        assert_eq!(TIMESTAMP.first_capture(entry), Some("2024-01-05T10:00:00.123Z"));
        assert_eq!(REQUEST_ID.first_capture(entry), Some("9f8e-77aa"));
        assert_eq!(MESSAGE_ID.first_capture(entry), Some("0a1b-2c3d"));
        assert_eq!(DURATION.first_capture(entry), Some("152.34"));
        assert_eq!(TIMESTAMP.field(), "timestamp");
    }
}
