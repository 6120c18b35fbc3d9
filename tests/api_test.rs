//! Integration tests for API endpoints

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use quantum_trade::config::Config;
use quantum_trade::{api, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    api::app(AppState::new(Config::default()))
}

fn example_snapshot() -> Value {
    json!({
        "symbol": "AAPL",
        "price": 150.0,
        "open": 148.0,
        "high": 152.0,
        "low": 147.0,
        "volume": 6000000.0,
        "changePercent": 4.2
    })
}

fn uptrend_history() -> Value {
    let prices: Vec<f64> = (0..50).map(|i| 76.5 + i as f64 * 1.5).collect();
    json!({ "prices": prices })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["scorer"], "rule_based");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_score_example_snapshot() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/analysis/score",
        Some(json!({ "snapshot": example_snapshot(), "history": uptrend_history() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["action"], "BUY");
    assert_eq!(body["meta"]["scorer"], "rule_based");
    let pattern = body["data"]["pattern"]["name"].as_str().unwrap();
    assert!(["bullish_breakout", "momentum_surge", "no_pattern"].contains(&pattern));
}

#[tokio::test]
async fn test_invalid_price_is_unprocessable() {
    let app = app();
    let mut snapshot = example_snapshot();
    snapshot["price"] = json!(0.0);
    let (status, body) = send(
        &app,
        "POST",
        "/api/analysis/score",
        Some(json!({ "snapshot": snapshot })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
    assert!(body["error"].as_str().unwrap().contains("price"));
}

#[tokio::test]
async fn test_indicators_and_pattern() {
    let app = app();
    let request = json!({ "snapshot": example_snapshot(), "history": uptrend_history() });

    let (status, body) = send(&app, "POST", "/api/analysis/indicators", Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let rsi = body["data"]["rsi"].as_f64().unwrap();
    assert!(rsi > 50.0 && rsi < 70.0);
    assert!(body["data"]["pivotPoints"]["pivot"].is_number());

    let (status, body) = send(&app, "POST", "/api/analysis/pattern", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], "AAPL");
    assert!(body["data"]["chartPatterns"]["type"].is_string());
}

#[tokio::test]
async fn test_options_flow_empty() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/options-flow", Some(json!([]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["overallSignal"]["signal"], "NO_DATA");
    assert_eq!(body["data"]["whaleActivity"]["totalWhaleFlows"], 0);
}

#[tokio::test]
async fn test_recommendations_respect_limit() {
    let app = app();
    let mut snapshots = serde_json::Map::new();
    for (symbol, price, change) in [
        ("AAPL", 150.0, 4.2),
        ("NVDA", 480.0, 6.5),
        ("TSLA", 240.0, -5.5),
        ("QQQ", 400.0, 2.8),
    ] {
        snapshots.insert(
            symbol.to_string(),
            json!({
                "price": price,
                "open": price / (1.0 + change / 100.0),
                "high": price * 1.01,
                "low": price * 0.98,
                "volume": 6500000.0,
                "changePercent": change
            }),
        );
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/recommendations",
        Some(json!({ "snapshots": snapshots, "options": { "limit": 2, "minConfidence": 0 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let recs = body["data"].as_array().unwrap();
    assert!(recs.len() <= 2);
    for rec in recs {
        assert!(rec["symbol"].is_string());
        assert!(rec["riskRewardRatio"].as_str().unwrap().starts_with("1:"));
    }

    let (status, _) = send(
        &app,
        "POST",
        "/api/recommendations",
        Some(json!({ "snapshots": {}, "options": { "limit": 0 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trades_update_stats() {
    let app = app();

    let (status, body) = send(&app, "POST", "/api/trades", Some(json!({ "profit": 5.0 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("strategy"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/trades",
        Some(json!({
            "strategy": "breakout",
            "profit": 80.0,
            "percentReturn": 4.0,
            "pattern": "bullish_breakout"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["strategy"], "breakout");
    assert_eq!(body["data"]["epochs"], 1);

    let (status, body) = send(&app, "GET", "/api/stats/strategies", None).await;
    assert_eq!(status, StatusCode::OK);
    let breakout = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "breakout")
        .cloned()
        .unwrap();
    assert_eq!(breakout["trades"], 135);
    assert_eq!(breakout["wins"], 1);

    let (status, body) = send(&app, "GET", "/api/stats/performance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalTrades"], 1);
}

#[tokio::test]
async fn test_learning_snapshot_round_trip() {
    let app = app();
    let (status, exported) = send(&app, "GET", "/api/learning/snapshot", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(exported["data"]["strategies"]["swing"].is_object());

    let (status, body) = send(
        &app,
        "PUT",
        "/api/learning/snapshot",
        Some(json!({ "strategies": { "custom": { "trades": 3, "performance": 0.9 } } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["strategies"], 1);

    let (_, body) = send(&app, "GET", "/api/stats/strategies", None).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["custom"]);
}

#[tokio::test]
async fn test_history_endpoints() {
    let app = app();

    let (status, _) = send(&app, "GET", "/api/history/msft", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let bars: Vec<Value> = (0..5)
        .map(|i| {
            let close = 300.0 + i as f64;
            json!({ "time": i, "open": close, "high": close + 2.0, "low": close - 2.0, "close": close, "volume": 1000.0 })
        })
        .collect();
    let (status, body) = send(&app, "POST", "/api/history/msft", Some(json!(bars))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], "MSFT");
    assert_eq!(body["data"]["stored"], 5);

    let (status, body) = send(&app, "GET", "/api/history/MSFT", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bars"].as_array().unwrap().len(), 5);

    let bad = json!([{ "time": 9, "open": 1.0, "high": 1.0, "low": 1.0, "close": -1.0 }]);
    let (status, _) = send(&app, "POST", "/api/history/MSFT", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", "/api/history/MSFT", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/history/MSFT", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
