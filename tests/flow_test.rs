//! Integration tests for the options-flow analyzer

use chrono::{Duration, TimeZone, Utc};
use quantum_trade::services::{analyze_options_flow, FlowAnalyzer};
use quantum_trade::types::{FlowSignalLabel, OptionType, OptionsFlowRecord};

fn record(option_type: OptionType, strike: f64, volume: f64, premium: f64) -> OptionsFlowRecord {
    OptionsFlowRecord {
        symbol: "SPY".to_string(),
        option_type,
        strike,
        expiration: Some("2026-03-20".to_string()),
        premium,
        volume,
        timestamp: None,
        sentiment: None,
    }
}

fn bullish_flows() -> Vec<OptionsFlowRecord> {
    vec![
        record(OptionType::Call, 150.0, 1_000.0, 200_000.0),
        record(OptionType::Call, 150.0, 1_000.0, 200_000.0),
        record(OptionType::Call, 150.0, 1_000.0, 200_000.0),
        record(OptionType::Put, 140.0, 100.0, 10_000.0),
    ]
}

#[test]
fn test_empty_input_is_no_data() {
    let result = analyze_options_flow(&[]);
    assert_eq!(result.overall_signal.signal, FlowSignalLabel::NoData);
    assert_eq!(result.overall_signal.confidence, 0.0);
    assert_eq!(result.whale_activity.total_whale_flows, 0);
    assert_eq!(result.sentiment_analysis.call_count, 0);
    assert_eq!(result.sentiment_analysis.put_count, 0);
    assert_eq!(result.volume_analysis.total_contracts, 0);
    assert_eq!(result.time_analysis.total_flows, 0);
    assert!(result.unusual_activity.is_empty());
    assert!(result.strategies.is_empty());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["overallSignal"]["signal"], "NO_DATA");
}

#[test]
fn test_call_heavy_flow_is_bullish() {
    let now = Utc.with_ymd_and_hms(2026, 3, 16, 15, 0, 0).unwrap();
    let result = FlowAnalyzer::default().analyze(&bullish_flows(), now);

    assert_eq!(result.sentiment_analysis.call_count, 3);
    assert_eq!(result.sentiment_analysis.put_count, 1);
    assert!((result.sentiment_analysis.call_put_ratio - 30.0).abs() < 1e-9);
    assert_eq!(result.sentiment_analysis.sentiment_score, 75.0);

    assert_eq!(result.whale_activity.total_whale_flows, 4);
    assert!((result.whale_activity.whale_call_put_ratio - 60.0).abs() < 1e-9);
    assert_eq!(result.whale_activity.largest_flow, 200_000.0);

    assert_eq!(result.overall_signal.signal, FlowSignalLabel::Bullish);
    assert!((result.overall_signal.score - 0.625).abs() < 1e-9);
    assert!(result.overall_signal.confidence <= 95.0);

    // counted per distinct expiration date
    assert_eq!(result.time_analysis.short_term_flows, 1);
    assert_eq!(result.time_analysis.most_popular_expiration, "2026-03-20");
}

#[test]
fn test_put_heavy_flow_is_bearish() {
    let flows: Vec<OptionsFlowRecord> = bullish_flows()
        .into_iter()
        .map(|mut r| {
            r.option_type = match r.option_type {
                OptionType::Call => OptionType::Put,
                OptionType::Put => OptionType::Call,
            };
            r
        })
        .collect();
    let result = analyze_options_flow(&flows);
    assert!(result.overall_signal.score < -0.3);
    assert_eq!(result.overall_signal.signal, FlowSignalLabel::Bearish);
    assert_eq!(result.overall_signal.signal.direction(), -1);
}

#[test]
fn test_distant_expirations_are_not_short_term() {
    let now = Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap();
    let mut flows = bullish_flows();
    flows[0].expiration = Some((now + Duration::days(3)).format("%Y-%m-%d").to_string());
    let result = FlowAnalyzer::default().analyze(&flows, now);
    assert_eq!(result.time_analysis.short_term_flows, 1);
}

#[test]
fn test_records_deserialize_from_feed_json() {
    let json = r#"[
        {"symbol": "QQQ", "type": "call", "strike": 400, "expiration": "2026-06-19", "premium": 75000, "volume": 250},
        {"symbol": "QQQ", "type": "put", "strike": 380, "premium": 5000, "volume": 10}
    ]"#;
    let records: Vec<OptionsFlowRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].is_call());
    assert!(records[1].expiration.is_none());
    let result = analyze_options_flow(&records);
    assert_eq!(result.whale_activity.total_whale_flows, 1);
}
