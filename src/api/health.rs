use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    scorer: &'static str,
    tracked_symbols: usize,
    closed_trades: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        scorer: state.config.scorer.as_str(),
        tracked_symbols: state.history().symbols().len(),
        closed_trades: state.registry().performance_metrics().total_trades,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
