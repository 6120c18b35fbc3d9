//! Learning endpoints:
//!
//! - POST /api/trades - record a closed trade
//! - GET /api/stats/strategies - per-strategy statistics
//! - GET /api/stats/patterns - per-pattern statistics
//! - GET /api/stats/performance - aggregate performance metrics
//! - GET /api/learning/snapshot - export the registry
//! - PUT /api/learning/snapshot - replace the registry

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use super::ApiResponse;
use crate::error::AppError;
use crate::types::{
    ClosedTrade, LearningUpdate, NamedPatternStats, NamedStrategyStats, PerformanceMetrics,
    RegistrySnapshot,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trades", post(record_trade))
        .route("/stats/strategies", get(strategy_stats))
        .route("/stats/patterns", get(pattern_stats))
        .route("/stats/performance", get(performance))
        .route("/learning/snapshot", get(export_snapshot).put(import_snapshot))
}

async fn record_trade(
    State(state): State<AppState>,
    Json(trade): Json<ClosedTrade>,
) -> Result<Json<ApiResponse<LearningUpdate>>, AppError> {
    let update = state.engine.record_closed_trade(&trade)?;
    state.persist_learning().await;
    Ok(Json(ApiResponse::new(&state, update)))
}

async fn strategy_stats(State(state): State<AppState>) -> Json<ApiResponse<Vec<NamedStrategyStats>>> {
    let stats = state
        .registry()
        .strategy_stats()
        .into_iter()
        .map(|(name, stats)| NamedStrategyStats { name, stats })
        .collect();
    Json(ApiResponse::new(&state, stats))
}

async fn pattern_stats(State(state): State<AppState>) -> Json<ApiResponse<Vec<NamedPatternStats>>> {
    let stats = state
        .registry()
        .pattern_stats()
        .into_iter()
        .map(|(name, stats)| NamedPatternStats { name, stats })
        .collect();
    Json(ApiResponse::new(&state, stats))
}

async fn performance(State(state): State<AppState>) -> Json<ApiResponse<PerformanceMetrics>> {
    let metrics = state.registry().performance_metrics();
    Json(ApiResponse::new(&state, metrics))
}

async fn export_snapshot(State(state): State<AppState>) -> Json<ApiResponse<RegistrySnapshot>> {
    let snapshot = state.registry().snapshot();
    Json(ApiResponse::new(&state, snapshot))
}

async fn import_snapshot(
    State(state): State<AppState>,
    Json(snapshot): Json<RegistrySnapshot>,
) -> Json<ApiResponse<LearningSummary>> {
    let summary = LearningSummary {
        strategies: snapshot.strategies.len(),
        patterns: snapshot.patterns.len(),
        trades: snapshot.trades.len(),
    };
    state.registry().restore(snapshot);
    info!(
        "Learning state replaced: {} strategies, {} patterns, {} trades",
        summary.strategies, summary.patterns, summary.trades
    );
    state.persist_learning().await;
    Json(ApiResponse::new(&state, summary))
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningSummary {
    pub strategies: usize,
    pub patterns: usize,
    pub trades: usize,
}
