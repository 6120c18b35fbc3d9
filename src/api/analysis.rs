//! Single-snapshot analysis endpoints.
//!
//! - POST /api/analysis/indicators - full indicator set with an overall signal
//! - POST /api/analysis/pattern - snapshot setup plus chart patterns of the history
//! - POST /api/analysis/score - score with the configured scorer
//!
//! Each takes `{ snapshot, history? }`. Without a history the stored one for
//! the symbol is used, or a synthetic walk when too few bars are stored.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::error::AppError;
use crate::services::features::validate_input;
use crate::services::{compute_indicators, detect_setup, identify_chart_patterns};
use crate::types::{
    ChartPatternSet, IndicatorSet, MarketSnapshot, Pattern, PriceSeries, ScoreOutcome,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub snapshot: MarketSnapshot,
    #[serde(default)]
    pub history: Option<PriceSeries>,
}

impl AnalysisRequest {
    fn history(&self, state: &AppState) -> PriceSeries {
        self.history
            .clone()
            .unwrap_or_else(|| state.engine.history_for(&self.snapshot))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub symbol: String,
    /// Setup classified from the snapshot.
    pub setup: Pattern,
    /// Chart patterns matched in the history.
    pub chart_patterns: ChartPatternSet,
    /// Strongest chart pattern.
    pub strongest: Pattern,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/indicators", post(indicators))
        .route("/pattern", post(pattern))
        .route("/score", post(score))
}

async fn indicators(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<ApiResponse<IndicatorSet>>, AppError> {
    let history = request.history(&state);
    validate_input(&request.snapshot, &history)?;
    let set = compute_indicators(&request.snapshot, &history);
    Ok(Json(ApiResponse::new(&state, set)))
}

async fn pattern(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<ApiResponse<PatternAnalysis>>, AppError> {
    let history = request.history(&state);
    let features = state.extractor.simple(&request.snapshot, &history)?;
    let chart_patterns = identify_chart_patterns(&history.prices);

    Ok(Json(ApiResponse::new(
        &state,
        PatternAnalysis {
            symbol: request.snapshot.symbol.clone(),
            setup: detect_setup(&features),
            strongest: chart_patterns.strongest(),
            chart_patterns,
        },
    )))
}

async fn score(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<ApiResponse<ScoreOutcome>>, AppError> {
    let outcome = state
        .engine
        .score_snapshot(&request.snapshot, request.history.as_ref())?;
    Ok(Json(ApiResponse::new(&state, outcome)))
}
