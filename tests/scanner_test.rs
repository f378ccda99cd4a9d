//! Integration tests for the pattern scan pipeline

mod common;

use common::{match_json, MockHistory, MockOracle, MockSearch};
use patternscope::error::ScanError;
use patternscope::services::{PatternScanner, ScanSettings, SectorRosters, UniverseResolver};
use patternscope::types::{ScanRequest, SectorId};
use std::sync::Arc;
use std::time::Duration;

fn roster(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}

fn two_sector_rosters() -> Arc<SectorRosters> {
    Arc::new(SectorRosters::from_entries(vec![
        (SectorId::Technology, roster("T", 10)),
        (SectorId::Energy, roster("E", 10)),
    ]))
}

fn settings() -> ScanSettings {
    ScanSettings {
        fetch_timeout: Duration::from_millis(200),
        analysis_timeout: Duration::from_secs(2),
        ..ScanSettings::default()
    }
}

fn scanner(resolver: UniverseResolver, history: Arc<MockHistory>, oracle: Arc<MockOracle>) -> PatternScanner {
    PatternScanner::new(Arc::new(resolver), history, oracle, settings()).unwrap()
}

#[tokio::test]
async fn test_all_sectors_scans_every_roster_in_order() {
    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::returning("[]"));
    let scanner = scanner(UniverseResolver::new(two_sector_rosters()), history, oracle.clone());

    let report = scanner.scan(&ScanRequest::new("Hammer", SectorId::All)).await.unwrap();

    let mut expected = roster("T", 10);
    expected.extend(roster("E", 10));
    assert_eq!(oracle.seen_symbols(), expected);
    assert_eq!(report.scanned_symbols, expected);
    assert!(report.failed_symbols.is_empty());
    assert!(report.matches.is_empty());
}

#[tokio::test]
async fn test_search_failure_falls_back_to_default_roster() {
    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::returning("[]"));
    let resolver = UniverseResolver::new(two_sector_rosters())
        .with_search(Arc::new(MockSearch::failing()), Duration::from_millis(200));
    let scanner = scanner(resolver, history, oracle.clone());

    scanner.scan(&ScanRequest::new("Doji", SectorId::Energy)).await.unwrap();

    assert_eq!(oracle.seen_symbols(), roster("E", 10));
}

#[tokio::test]
async fn test_search_results_override_roster() {
    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::returning("[]"));
    let resolver = UniverseResolver::new(two_sector_rosters())
        .with_search(Arc::new(MockSearch::returning(&["xom", "CVX", "XOM"])), Duration::from_millis(200));
    let scanner = scanner(resolver, history, oracle.clone());

    scanner.scan(&ScanRequest::new("Doji", SectorId::Energy)).await.unwrap();

    assert_eq!(oracle.seen_symbols(), vec!["XOM", "CVX"]);
}

#[tokio::test]
async fn test_partial_fetch_failure_continues() {
    let rosters = Arc::new(SectorRosters::from_entries(vec![(
        SectorId::Finance,
        vec!["A".into(), "B".into(), "C".into(), "D".into(), "E".into()],
    )]));
    let history = Arc::new(MockHistory::new(30).failing(&["C"]));
    let oracle = Arc::new(MockOracle::returning(&format!("[{}]", match_json("B", 88.0))));
    let scanner = scanner(UniverseResolver::new(rosters), history, oracle.clone());

    let report = scanner.scan(&ScanRequest::new("Hammer", SectorId::Finance)).await.unwrap();

    assert_eq!(oracle.seen_symbols(), vec!["A", "B", "D", "E"]);
    assert_eq!(report.failed_symbols, vec!["C"]);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].symbol, "B");
    assert_eq!(report.matches[0].sector, "finance");
}

#[tokio::test]
async fn test_slow_fetch_counts_as_failure() {
    let rosters = Arc::new(SectorRosters::from_entries(vec![(
        SectorId::Utilities,
        vec!["NEE".into(), "DUK".into()],
    )]));
    let history = Arc::new(MockHistory::new(30).slow(&["DUK"]));
    let oracle = Arc::new(MockOracle::returning("[]"));
    let scanner = scanner(UniverseResolver::new(rosters), history, oracle.clone());

    let report = scanner.scan(&ScanRequest::new("Doji", SectorId::Utilities)).await.unwrap();

    assert_eq!(report.scanned_symbols, vec!["NEE"]);
    assert_eq!(report.failed_symbols, vec!["DUK"]);
}

#[tokio::test]
async fn test_all_fetches_failing_is_no_data() {
    let history = Arc::new(MockHistory::new(30).failing(&roster("E", 10).iter().map(String::as_str).collect::<Vec<_>>()));
    let oracle = Arc::new(MockOracle::returning("[]"));
    let scanner = scanner(UniverseResolver::new(two_sector_rosters()), history, oracle.clone());

    let err = scanner.scan(&ScanRequest::new("Hammer", SectorId::Energy)).await.unwrap_err();

    assert!(matches!(err, ScanError::NoData { ref sector } if sector == "energy"));
    assert!(oracle.seen_symbols().is_empty());
}

#[tokio::test]
async fn test_malformed_oracle_output_is_empty_success() {
    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::returning("I could not find any patterns, sorry."));
    let scanner = scanner(UniverseResolver::new(two_sector_rosters()), history, oracle);

    let report = scanner.scan(&ScanRequest::new("Hammer", SectorId::Technology)).await.unwrap();

    assert!(report.matches.is_empty());
    assert_eq!(report.scanned_symbols.len(), 10);
}

#[tokio::test]
async fn test_oracle_error_is_analysis_failure() {
    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::failing());
    let scanner = scanner(UniverseResolver::new(two_sector_rosters()), history, oracle);

    let err = scanner.scan(&ScanRequest::new("Hammer", SectorId::Technology)).await.unwrap_err();

    assert!(matches!(err, ScanError::Analysis(_)));
}

#[tokio::test]
async fn test_empty_pattern_is_rejected_before_fetching() {
    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::returning("[]"));
    let scanner = scanner(UniverseResolver::new(two_sector_rosters()), history.clone(), oracle);

    let err = scanner.scan(&ScanRequest::new("  ", SectorId::All)).await.unwrap_err();

    assert!(matches!(err, ScanError::InvalidRequest(_)));
    assert!(history.requested().is_empty());
}

#[tokio::test]
async fn test_matches_are_filtered_ranked_and_capped() {
    let confidences = [72.0, 95.0, 40.0, 88.0, 70.0, 69.9, 99.0, 81.0, 75.0, 90.0, 85.0, 77.0, 91.0];
    let entries: Vec<String> = confidences
        .iter()
        .enumerate()
        .map(|(i, c)| match_json(&format!("T{}", i), *c))
        .collect();
    let text = format!("```json\n[{}]\n```", entries.join(","));

    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::returning(&text));
    let scanner = scanner(UniverseResolver::new(two_sector_rosters()), history, oracle);

    let report = scanner.scan(&ScanRequest::new("Hammer", SectorId::All)).await.unwrap();

    let got: Vec<f64> = report.matches.iter().map(|m| m.confidence).collect();
    assert_eq!(got, vec![99.0, 95.0, 91.0, 90.0, 88.0, 85.0, 81.0, 77.0, 75.0, 72.0]);
    assert_eq!(report.matches[0].sector, "technology");
}

#[tokio::test]
async fn test_model_sector_labels_are_normalized() {
    let text = r#"[
        {"symbol":"E1","confidence":90,"price":50.0,"sector":"Tech"},
        {"symbol":"E2","confidence":80,"price":60.0,"sector":"Bonds"}
    ]"#;
    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::returning(text));
    let scanner = scanner(UniverseResolver::new(two_sector_rosters()), history, oracle);

    let report = scanner.scan(&ScanRequest::new("Doji", SectorId::Energy)).await.unwrap();

    assert_eq!(report.matches[0].sector, "technology");
    assert_eq!(report.matches[1].sector, "energy");
}

#[tokio::test]
async fn test_each_scan_gets_a_fresh_id() {
    let history = Arc::new(MockHistory::new(30));
    let oracle = Arc::new(MockOracle::returning("[]"));
    let scanner = scanner(UniverseResolver::new(two_sector_rosters()), history, oracle);
    let request = ScanRequest::new("Hammer", SectorId::Energy);

    let first = scanner.scan(&request).await.unwrap();
    let second = scanner.scan(&request).await.unwrap();

    assert_ne!(first.scan_id, second.scan_id);
    assert_eq!(first.pattern, "Hammer");
}

#[test]
fn test_default_rosters_resolve_all_to_cap() {
    let resolver = UniverseResolver::new(Arc::new(SectorRosters::defaults()));
    let symbols = tokio_test::block_on(resolver.resolve(SectorId::All));
    assert_eq!(symbols.len(), patternscope::services::MAX_UNIVERSE);
}
