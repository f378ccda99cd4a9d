//! Wire shapes of types that cross module boundaries

use chrono::NaiveDate;
use patternscope::types::*;

#[test]
fn test_pattern_match_wire_shape() {
    let json = r#"{
        "symbol": "AAPL",
        "confidence": 85,
        "price": 150.25,
        "sector": "technology",
        "patternComplete": true,
        "volumeConfirms": false,
        "analysis": {
            "description": "Clean hammer at support",
            "keyLevels": {"support": 145.0, "resistance": 155.0, "breakoutTarget": 162.5},
            "formationPeriod": {"start": "2024-01-02", "end": "2024-01-10"},
            "patternPoints": [{"date": "2024-01-05", "price": 146.1, "significance": "Hammer low"}],
            "volumeAnalysis": "Above average"
        }
    }"#;

    let m: PatternMatch = serde_json::from_str(json).unwrap();
    let analysis = m.analysis.as_ref().unwrap();
    assert_eq!(analysis.key_levels.breakout_target, 162.5);
    assert_eq!(analysis.pattern_points.len(), 1);

    let out = serde_json::to_value(&m).unwrap();
    assert_eq!(out["patternComplete"], true);
    assert_eq!(out["analysis"]["formationPeriod"]["end"], "2024-01-10");
}

#[test]
fn test_completed_scan_state_wire_shape() {
    let report = ScanReport {
        scan_id: "scan-1".to_string(),
        pattern: "Hammer".to_string(),
        sector: SectorId::RealEstate,
        matches: Vec::new(),
        scanned_symbols: vec!["PLD".to_string()],
        failed_symbols: vec!["AMT".to_string()],
        timestamp: 1_700_000_000_000,
    };

    let out = serde_json::to_value(OperationState::Complete(report)).unwrap();
    assert_eq!(out["status"], "complete");
    assert_eq!(out["result"]["scanId"], "scan-1");
    assert_eq!(out["result"]["sector"], "realestate");
    assert_eq!(out["result"]["failedSymbols"][0], "AMT");

    let failed: OperationState<ScanReport> = OperationState::Failed("No data".to_string());
    let out = serde_json::to_value(failed).unwrap();
    assert_eq!(out["status"], "failed");
    assert_eq!(out["result"], "No data");
}

#[test]
fn test_sector_stock_uses_sector_tag() {
    let stock = SectorStock {
        symbol: "ENPH".to_string(),
        name: "Enphase".to_string(),
        sector: SectorId::Energy,
    };
    let out = serde_json::to_value(&stock).unwrap();
    assert_eq!(out["sector"], "energy");
}

#[test]
fn test_chat_request_accepts_chart_data_alias() {
    let json = r#"{
        "symbol": "TSLA",
        "messages": [{"role": "user", "content": "hi"}],
        "chartData": [{"date": "2024-05-01", "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10}]
    }"#;
    let request: ChatRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.messages[0].role, ChatRole::User);

    let bars = request.bars.unwrap();
    assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    assert!(PriceSeries::from_bars(&request.symbol, bars).latest().is_some());
}
