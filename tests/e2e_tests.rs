//! End-to-end integration tests
//!
//! These tests validate the complete analysis pipeline using predefined log
//! fixtures. Each fixture test:
//! 1. Reads input.log from a fixture directory
//! 2. Runs the full analysis with the selected strategy
//! 3. Writes the records CSV
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Running balances crossing into overdraft and back
//! - Failed and errored transactions
//! - Several subscribers logged out of order, plus the untracked `unknown` one
//! - Noise: preamble text, skip messages, thousands separators, missing amounts
//!
//! Compressed and archived inputs are built in temp directories from the same
//! fixtures. Every test runs with both the sync and the async strategy.

#[cfg(test)]
mod tests {
    use balance_sync_analyzer::cli::{OutputKind, StrategyType};
    use balance_sync_analyzer::strategy::create_strategy;
    use balance_sync_analyzer::{AnalysisConfig, AnalysisReport, AnalyzerError};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const HEADER: &str = "timestamp,request_id,message_id,subscriber_id,transaction_type,operation,status,amount,balance_change,running_balance,is_overdraft,source_file,folder_path";

    fn fixture_path(fixture_name: &str, file: &str) -> PathBuf {
        Path::new("tests/fixtures").join(fixture_name).join(file)
    }

    fn analyze(path: &Path, strategy_type: StrategyType) -> AnalysisReport {
        create_strategy(strategy_type, None)
            .process(path, &AnalysisConfig::default())
            .unwrap_or_else(|e| panic!("Failed to analyze {}: {}", path.display(), e))
    }

    fn render(report: &AnalysisReport, kind: OutputKind) -> String {
        let mut output = Vec::new();
        report
            .write_csv(kind, &mut output)
            .expect("Failed to write report");
        String::from_utf8(output).expect("Report is not UTF-8")
    }

    /// Run a test fixture by analyzing input.log and comparing with expected.csv
    ///
    /// # Arguments
    ///
    /// * `fixture_name` - Name of the fixture directory (e.g., "overdraft_transition")
    /// * `strategy_type` - Processing strategy to use (Sync or Async)
    ///
    /// # Panics
    ///
    /// Panics if the fixture files cannot be read or the output doesn't match
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let input_path = fixture_path(fixture_name, "input.log");
        let expected_path = fixture_path(fixture_name, "expected.csv");

        assert!(
            input_path.exists(),
            "Input file not found: {}",
            input_path.display()
        );
        assert!(
            expected_path.exists(),
            "Expected file not found: {}",
            expected_path.display()
        );

        let report = analyze(&input_path, strategy_type);
        let actual_output = render(&report, OutputKind::Records);

        let expected_output = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read expected file {}: {}",
                expected_path.display(),
                e
            )
        });

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both processing strategies
    #[rstest]
    #[case("overdraft_transition")]
    #[case("failed_status")]
    #[case("mixed_subscribers")]
    #[case("noisy_entries")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }

    #[rstest]
    fn test_single_alert_on_transition(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let report = analyze(
            &fixture_path("overdraft_transition", "input.log"),
            strategy,
        );

        assert_eq!(
            render(&report, OutputKind::Alerts),
            "subscriber_id,timestamp,balance,transaction_amount,transaction_type,severity,message\n\
             sub_alpha,2024-03-01 08:10:00.000,-50.00,150.00,debit,medium,Overdraft detected: $50.00\n"
        );

        let summary = report.overdraft_summary();
        assert_eq!(summary.total_overdrafts, 2);
        assert_eq!(summary.subscribers_in_overdraft, 1);
        assert_eq!(summary.total_overdraft_amount.to_string(), "200.00");
    }

    #[rstest]
    fn test_balances_exclude_unknown_subscriber(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let report = analyze(&fixture_path("mixed_subscribers", "input.log"), strategy);

        assert_eq!(
            render(&report, OutputKind::Balances),
            "subscriber_id,balance\nsub_eta,-5.00\nsub_zeta,7.25\n"
        );
        assert_eq!(report.alerts.len(), 1);
    }

    #[rstest]
    fn test_noise_is_counted(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let report = analyze(&fixture_path("noisy_entries", "input.log"), strategy);

        assert_eq!(report.parse_stats.total_entries, 5);
        assert_eq!(report.parse_stats.parsed, 3);
        assert_eq!(report.parse_stats.skip_messages, 1);
        assert_eq!(report.parse_stats.missing_timestamp, 1);
    }

    #[rstest]
    fn test_gzip_input_matches_plain(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let content = fs::read(fixture_path("overdraft_transition", "input.log")).unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("balance-sync.log.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(&content).unwrap();
        encoder.finish().unwrap();

        let report = analyze(&path, strategy);

        let expected =
            fs::read_to_string(fixture_path("overdraft_transition", "expected.csv")).unwrap();
        assert_eq!(render(&report, OutputKind::Records), expected);
    }

    #[rstest]
    fn test_zip_members_carry_provenance(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let alpha = fs::read(fixture_path("overdraft_transition", "input.log")).unwrap();
        let beta = fs::read(fixture_path("failed_status", "input.log")).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.zip");
        let mut writer = ZipWriter::new(fs::File::create(&path).unwrap());
        let options = SimpleFileOptions::default();

        writer.start_file("2024/03/alpha.log", options).unwrap();
        writer.write_all(&alpha).unwrap();

        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(&beta).unwrap();
        writer.start_file("beta.log.gz", options).unwrap();
        writer.write_all(&gz.finish().unwrap()).unwrap();
        writer.finish().unwrap();

        let report = analyze(&path, strategy);
        let output = render(&report, OutputKind::Records);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], HEADER);
        assert_eq!(lines.len(), 9);
        assert!(lines[1..5]
            .iter()
            .all(|line| line.contains(",sub_alpha,") && line.ends_with(",2024/03/alpha.log,2024/03")));
        assert!(lines[5..]
            .iter()
            .all(|line| line.contains(",sub_beta,") && line.ends_with(",beta.log.gz,root")));
        assert_eq!(report.balances.len(), 2);
    }

    #[rstest]
    fn test_skip_only_input(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("skips.log");
        fs::write(
            &path,
            "2024-03-01T08:00:00.000Z START RequestId: 0a0b\nSkipping the balance sync for subscriber_id: sub_1\n\
             2024-03-01T08:05:00.000Z START RequestId: 0a0c\nSkipping the balance sync for subscriber_id: sub_2\n",
        )
        .unwrap();

        let result = create_strategy(strategy, None).process(&path, &AnalysisConfig::default());
        assert!(matches!(
            result,
            Err(AnalyzerError::EmptyResult {
                skip_messages: 2,
                ..
            })
        ));

        let config = AnalysisConfig {
            synthetic_fallback: true,
            ..AnalysisConfig::default()
        };
        let report = create_strategy(strategy, None).process(&path, &config).unwrap();
        assert!(report.synthetic);
        assert_eq!(report.records.len(), 2);
        assert!(render(&report, OutputKind::Records).contains(",synthetic,synthetic"));
    }

    #[rstest]
    fn test_trends_and_anomalies_views(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let report = analyze(&fixture_path("overdraft_transition", "input.log"), strategy);

        let trends = render(&report, OutputKind::Trends);
        assert_eq!(
            trends.lines().nth(1),
            Some("sub_alpha,100.00,150.00,150.00,-150.00,119.24,increasing,4,0")
        );

        // Four records are below the detector's minimum history
        assert_eq!(
            render(&report, OutputKind::Anomalies),
            "type,subscriber_id,timestamp,description\n"
        );
    }

    #[rstest]
    fn test_summary_and_behaviour_views(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let report = analyze(&fixture_path("overdraft_transition", "input.log"), strategy);

        assert_eq!(
            render(&report, OutputKind::Summary),
            "metric,value\n\
             total_transactions,4\n\
             first_timestamp,2024-03-01 08:00:00.000\n\
             last_timestamp,2024-03-01 09:00:00.000\n\
             unique_subscribers,1\n\
             total_volume,650.00\n\
             average_amount,162.50\n\
             median_amount,125.00\n\
             largest_amount,300.00\n\
             smallest_amount,100.00\n\
             subscribers_with_overdrafts,1\n\
             overdraft_instances,2\n\
             average_running_balance,12.50\n\
             success_rate,50.00\n\
             average_duration_ms,12.50\n\
             source_files,0\n\
             folders,0\n\
             type:credit,1\n\
             type:debit,2\n\
             type:payment,1\n\
             operation:payment,1\n\
             operation:unknown,3\n"
        );

        // Half the records overdrawn, amounts varying by 0.58 of their mean
        assert_eq!(
            render(&report, OutputKind::Behaviour),
            "subscriber_id,total_transactions,total_volume,average_amount,frequency,preferred_type,risk_score,balance_stability\n\
             sub_alpha,4,650.00,162.50,same_day,debit,37.47,volatile\n"
        );
    }
}
