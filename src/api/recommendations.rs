//! POST /api/recommendations
//!
//! Body: `{ snapshots: { SYMBOL: snapshot, ... }, options?, optionsFlow? }`.
//! When `optionsFlow` records are given and the options carry no flow
//! signal, the analyzer's overall signal is folded into every candidate.

use std::collections::BTreeMap;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::debug;

use super::ApiResponse;
use crate::error::AppError;
use crate::types::{MarketSnapshot, OptionsFlowRecord, Recommendation, RecommendationOptions};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsRequest {
    pub snapshots: BTreeMap<String, MarketSnapshot>,
    #[serde(default)]
    pub options: RecommendationOptions,
    #[serde(default)]
    pub options_flow: Option<Vec<OptionsFlowRecord>>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(recommendations))
}

async fn recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationsRequest>,
) -> Result<Json<ApiResponse<Vec<Recommendation>>>, AppError> {
    let mut options = request.options;
    if let Some(limit) = options.limit.filter(|l| *l == 0) {
        return Err(AppError::BadRequest(format!("limit must be positive, got {}", limit)));
    }

    if options.flow_signal.is_none() {
        if let Some(records) = request.options_flow.filter(|r| !r.is_empty()) {
            let analysis = state.flow_analyzer.analyze(&records, chrono::Utc::now());
            debug!(
                "Folding options flow into recommendations: {:?} ({} records)",
                analysis.overall_signal.signal,
                records.len()
            );
            options.flow_signal = Some(analysis.overall_signal);
        }
    }

    let recommendations = state.engine.generate(&request.snapshots, &options);
    Ok(Json(ApiResponse::new(&state, recommendations)))
}
