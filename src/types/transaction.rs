//! Transaction-related types for the balance sync analyzer
//!
//! This module defines the closed vocabularies extracted from log entries
//! (transaction type, status, operation), the parsed `TransactionRecord`,
//! and the `BalancedRecord` produced once the balance engine has annotated it.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// Subscriber identifier as it appears in the logs
pub type SubscriberId = String;

/// Subscriber id that is never tracked by the ledger or the anomaly detector
pub const UNKNOWN_SUBSCRIBER: &str = "unknown";

/// Transaction types recognised in balance sync logs
///
/// Only `Credit`, `Debit`, `Payment`, `Refund` and `Charge` are ever extracted
/// from log text. `Withdrawal` exists so records from other sources can be
/// folded, and `Unknown` is the default when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Funds added to the subscriber balance
    Credit,

    /// Funds removed from the subscriber balance
    Debit,

    /// Payment received from the subscriber (increases balance)
    Payment,

    /// Refund issued to the subscriber (increases balance)
    Refund,

    /// Charge applied to the subscriber (decreases balance)
    Charge,

    /// Withdrawal from the subscriber balance
    Withdrawal,

    /// No recognised transaction keyword
    Unknown,
}

impl TransactionType {
    /// Parse a lowercase or mixed-case keyword into a transaction type
    ///
    /// Unrecognised keywords map to `Unknown`.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "credit" => TransactionType::Credit,
            "debit" => TransactionType::Debit,
            "payment" => TransactionType::Payment,
            "refund" => TransactionType::Refund,
            "charge" => TransactionType::Charge,
            "withdrawal" => TransactionType::Withdrawal,
            _ => TransactionType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
            TransactionType::Payment => "payment",
            TransactionType::Refund => "refund",
            TransactionType::Charge => "charge",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Unknown => "unknown",
        }
    }
}

/// Normalized outcome of the logged operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Failed,
    Error,
    Completed,
    Unknown,
}

impl Status {
    /// Normalize a matched status token
    ///
    /// Anything containing "success" becomes `Success`, the literal tokens
    /// "failed" and "error" are kept, and any other recognised token is
    /// treated as `Completed`.
    pub fn normalize(token: &str) -> Self {
        let token = token.to_ascii_lowercase();
        if token.contains("success") {
            Status::Success
        } else if token == "failed" {
            Status::Failed
        } else if token == "error" {
            Status::Error
        } else {
            Status::Completed
        }
    }

    /// Whether the transaction never took effect on the balance
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failed | Status::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failed => "failed",
            Status::Error => "error",
            Status::Completed => "completed",
            Status::Unknown => "unknown",
        }
    }
}

/// High-level operation the log invocation performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSubscription,
    BalanceSync,
    Payment,
    Refund,
    Charge,
    Unknown,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateSubscription => "create_subscription",
            Operation::BalanceSync => "balance_sync",
            Operation::Payment => "payment",
            Operation::Refund => "refund",
            Operation::Charge => "charge",
            Operation::Unknown => "unknown",
        }
    }
}

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOrigin {
    /// Extracted from a real log entry
    #[default]
    Parsed,

    /// Fabricated illustrative record (synthetic fallback only)
    Synthetic,
}

/// Archive provenance of a record
///
/// Only present for records drawn from a multi-member archive or for
/// synthetic records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Member path inside the archive (e.g. `2024/01/app.log.gz`)
    pub source_file: String,

    /// Directory part of the member path, `root` for top-level members
    pub folder_path: String,
}

impl Provenance {
    /// Build provenance from an archive member path
    pub fn from_member(member: &str) -> Self {
        let folder_path = match member.rsplit_once('/') {
            Some((folder, _)) if !folder.is_empty() => folder.to_string(),
            _ => "root".to_string(),
        };

        Provenance {
            source_file: member.to_string(),
            folder_path,
        }
    }
}

/// A single transaction extracted from one log invocation
///
/// Every record that leaves the field extractor has a timestamp; entries
/// without one are dropped before a record is ever built.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Timezone-naive instant of the invocation (UTC wall clock)
    pub timestamp: NaiveDateTime,

    /// Invocation request id, or an `unknown_<n>` surrogate
    pub request_id: String,

    /// Processed message id, or a `msg_<n>` surrogate
    pub message_id: String,

    /// Subscriber the transaction applies to, or a `sub_unknown_<n>` surrogate
    pub subscriber_id: SubscriberId,

    pub transaction_type: TransactionType,

    /// Non-negative amount; zero when missing or malformed
    pub amount: Decimal,

    /// Entry mentioned overdraft / negative balance / insufficient funds
    ///
    /// Lexical flag only, independent of the computed balance.
    pub overdraft_keyword: bool,

    pub status: Status,

    pub duration_ms: f64,

    pub operation: Operation,

    /// The full entry text the record was extracted from
    pub raw_text: String,

    pub provenance: Option<Provenance>,

    pub origin: RecordOrigin,
}

impl TransactionRecord {
    /// Create a record with neutral defaults for everything but the key fields
    ///
    /// Convenient for callers that build records outside the log parser
    /// (tests, other ingestion sources).
    pub fn new(
        timestamp: NaiveDateTime,
        subscriber_id: impl Into<SubscriberId>,
        transaction_type: TransactionType,
        amount: Decimal,
        status: Status,
    ) -> Self {
        TransactionRecord {
            timestamp,
            request_id: String::new(),
            message_id: String::new(),
            subscriber_id: subscriber_id.into(),
            transaction_type,
            amount,
            overdraft_keyword: false,
            status,
            duration_ms: 0.0,
            operation: Operation::Unknown,
            raw_text: String::new(),
            provenance: None,
            origin: RecordOrigin::Parsed,
        }
    }

    /// Whether this record belongs to a subscriber the ledger tracks
    pub fn is_tracked(&self) -> bool {
        self.subscriber_id != UNKNOWN_SUBSCRIBER
    }
}

/// A transaction record annotated by the balance engine
#[derive(Debug, Clone, PartialEq)]
pub struct BalancedRecord {
    pub record: TransactionRecord,

    /// Signed effect of this transaction on the balance
    pub balance_change: Decimal,

    /// Balance after applying this transaction
    pub running_balance: Decimal,

    /// `running_balance` is below the overdraft threshold
    pub is_overdraft: bool,
}

impl BalancedRecord {
    /// Annotation for records the engine does not track
    pub fn untracked(record: TransactionRecord) -> Self {
        BalancedRecord {
            record,
            balance_change: Decimal::ZERO,
            running_balance: Decimal::ZERO,
            is_overdraft: false,
        }
    }
}
