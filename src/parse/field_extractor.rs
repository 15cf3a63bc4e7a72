//! Per-entry field extraction
//!
//! This module provides the `FieldExtractor`, which turns one log entry into a
//! `TransactionRecord` by running the rule chains in `rules` over its text.
//!
//! Extraction is lenient. Only the timestamp is mandatory; every other field
//! falls back to a default (or to a surrogate id) when its rule chain finds
//! nothing. Entries recognised as intentionally skipped balance syncs are
//! counted and set aside before any rule runs.

use super::rules::{
    classify_operation, is_skip_message, AMOUNT, DURATION, MESSAGE_ID, OVERDRAFT, REQUEST_ID,
    STATUS, SUBSCRIBER, TIMESTAMP, TRANSACTION_TYPE,
};
use crate::types::{
    AnalyzerError, ParseStats, Provenance, RecordOrigin, Status, TransactionRecord,
    TransactionType,
};
use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Surrogate ids are reduced to this many distinct values
const SURROGATE_SPACE: u64 = 100_000;

/// What became of a single entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// The entry produced a record
    Parsed(TransactionRecord),

    /// The entry announced an intentionally skipped balance sync
    SkipMessage,
}

/// Turns log entries into transaction records, keeping a tally as it goes
#[derive(Debug, Default)]
pub struct FieldExtractor {
    stats: ParseStats,
}

impl FieldExtractor {
    /// Create an extractor with an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single entry
    ///
    /// # Arguments
    ///
    /// * `entry` - Text of one log invocation, as produced by the splitter
    ///
    /// # Returns
    ///
    /// * `Ok(EntryOutcome::Parsed)` - The entry produced a record
    /// * `Ok(EntryOutcome::SkipMessage)` - The entry was an intentional skip
    /// * `Err(AnalyzerError::MissingTimestamp)` - No parseable timestamp; the
    ///   entry is dropped
    pub fn parse_entry(&mut self, entry: &str) -> Result<EntryOutcome, AnalyzerError> {
        self.stats.total_entries += 1;

        if is_skip_message(entry) {
            self.stats.skip_messages += 1;
            return Ok(EntryOutcome::SkipMessage);
        }

        let Some(timestamp) = TIMESTAMP.first_capture(entry).and_then(parse_timestamp) else {
            self.stats.missing_timestamp += 1;
            return Err(AnalyzerError::MissingTimestamp);
        };

        let amount = match AMOUNT.first_capture(entry).map(parse_amount) {
            Some(Ok(amount)) => amount,
            Some(Err(e)) => {
                debug!(error = %e, "Defaulting malformed amount to zero");
                self.stats.malformed_amounts += 1;
                Decimal::ZERO
            }
            None => Decimal::ZERO,
        };

        let record = TransactionRecord {
            timestamp,
            request_id: REQUEST_ID
                .first_capture(entry)
                .map(str::to_string)
                .unwrap_or_else(|| surrogate_id("unknown_", entry)),
            message_id: MESSAGE_ID
                .first_capture(entry)
                .map(str::to_string)
                .unwrap_or_else(|| surrogate_id("msg_", entry)),
            subscriber_id: SUBSCRIBER
                .first_capture(entry)
                .map(str::to_string)
                .unwrap_or_else(|| surrogate_id("sub_unknown_", entry)),
            transaction_type: TRANSACTION_TYPE
                .first_capture(entry)
                .map(TransactionType::from_keyword)
                .unwrap_or(TransactionType::Unknown),
            amount,
            overdraft_keyword: OVERDRAFT.is_match(entry),
            status: STATUS
                .first_capture(entry)
                .map(Status::normalize)
                .unwrap_or(Status::Unknown),
            duration_ms: DURATION
                .first_capture(entry)
                .and_then(|raw| raw.parse::<f64>().ok())
                .unwrap_or(0.0),
            operation: classify_operation(entry),
            raw_text: entry.to_string(),
            provenance: None,
            origin: RecordOrigin::Parsed,
        };

        self.stats.parsed += 1;
        Ok(EntryOutcome::Parsed(record))
    }

    /// Parse every entry, tagging records with the given provenance
    ///
    /// Entries without a timestamp are dropped and skip messages are set
    /// aside; both are reflected in the tally.
    pub fn parse_entries(
        &mut self,
        entries: &[&str],
        provenance: Option<&Provenance>,
    ) -> Vec<TransactionRecord> {
        let mut records = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            match self.parse_entry(entry) {
                Ok(EntryOutcome::Parsed(mut record)) => {
                    record.provenance = provenance.cloned();
                    records.push(record);
                }
                Ok(EntryOutcome::SkipMessage) => {
                    debug!(entry = index + 1, "Balance sync skip message");
                }
                Err(e) if e.is_recoverable() => {
                    debug!(entry = index + 1, error = %e, "Dropped entry");
                }
                Err(e) => {
                    warn!(entry = index + 1, error = %e, "Dropped entry");
                }
            }
        }

        records
    }

    /// Tally so far
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn into_stats(self) -> ParseStats {
        self.stats
    }
}

/// Parse an ISO-8601 timestamp into a timezone-naive UTC instant
///
/// Offsets are applied before the offset is dropped. Inputs that are not
/// valid RFC 3339 are retried with the offset stripped off.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }

    let stripped = raw.trim_end_matches('Z');
    let stripped = stripped.split('+').next().unwrap_or(stripped);

    NaiveDateTime::parse_from_str(stripped, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(stripped, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Parse a captured dollar amount, ignoring thousands separators
pub fn parse_amount(raw: &str) -> Result<Decimal, AnalyzerError> {
    Decimal::from_str(&raw.replace(',', "")).map_err(|_| AnalyzerError::malformed_amount(raw))
}

/// 64-bit FNV-1a over the entry text
///
/// Stable across runs and platforms. Not cryptographic and not collision
/// resistant.
pub fn content_hash(text: &str) -> u64 {
    text.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Surrogate id for a field the entry did not contain
///
/// Only 100 000 distinct values exist per prefix, so unrelated entries can
/// share a surrogate.
fn surrogate_id(prefix: &str, entry: &str) -> String {
    format!("{}{}", prefix, content_hash(entry) % SURROGATE_SPACE)
}
