//! Analysis report
//!
//! Everything one analysis run produces, independent of the strategy that
//! produced it.

use crate::cli::OutputKind;
use crate::core::{balance_trends, overdraft_summary, subscriber_behaviour, summary_stats};
use crate::io::{
    write_alerts_csv, write_anomalies_csv, write_balances_csv, write_behaviour_csv,
    write_records_csv, write_summary_csv, write_trends_csv,
};
use crate::types::{
    Alert, AnalyzerError, Anomaly, BalanceTrend, BalancedRecord, OverdraftSummary, ParseStats,
    RecordStats, SubscriberBehaviour, SubscriberId, SummaryStats, TransactionRecord,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::Write;

/// Result of analysing one input path
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Balanced records, ordered by subscriber id and then timestamp
    pub records: Vec<BalancedRecord>,

    /// Overdraft alerts, in subscriber id order
    pub alerts: Vec<Alert>,

    pub anomalies: Vec<Anomaly>,

    /// Closing balance of every tracked subscriber
    pub balances: BTreeMap<SubscriberId, Decimal>,

    pub parse_stats: ParseStats,

    /// The records are synthetic demonstration data, not parsed log entries
    pub synthetic: bool,
}

impl AnalysisReport {
    pub fn overdraft_summary(&self) -> OverdraftSummary {
        overdraft_summary(&self.records)
    }

    pub fn balance_trends(&self) -> Vec<BalanceTrend> {
        balance_trends(&self.records)
    }

    /// Run statistics, `None` only for a report without records
    pub fn summary_stats(&self) -> Option<SummaryStats> {
        summary_stats(&self.records)
    }

    pub fn subscriber_behaviour(&self) -> Vec<SubscriberBehaviour> {
        subscriber_behaviour(&self.records)
    }

    /// Summary figures over the underlying transaction records
    pub fn record_stats(&self) -> RecordStats {
        let records: Vec<TransactionRecord> =
            self.records.iter().map(|r| r.record.clone()).collect();
        RecordStats::from_records(&records)
    }

    /// Write one of the report's CSV views
    ///
    /// # Arguments
    ///
    /// * `kind` - Which view to write
    /// * `output` - Destination for the CSV text
    pub fn write_csv(&self, kind: OutputKind, output: &mut dyn Write) -> Result<(), AnalyzerError> {
        match kind {
            OutputKind::Records => write_records_csv(&self.records, output),
            OutputKind::Balances => write_balances_csv(&self.balances, output),
            OutputKind::Alerts => write_alerts_csv(&self.alerts, output),
            OutputKind::Anomalies => write_anomalies_csv(&self.anomalies, output),
            OutputKind::Trends => write_trends_csv(&self.balance_trends(), output),
            OutputKind::Summary => write_summary_csv(self.summary_stats().as_ref(), output),
            OutputKind::Behaviour => write_behaviour_csv(&self.subscriber_behaviour(), output),
        }
    }
}
