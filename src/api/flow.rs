//! POST /api/options-flow - analyze a list of option flow records.

use axum::{extract::State, routing::post, Json, Router};

use super::ApiResponse;
use crate::types::{FlowAnalysisResult, OptionsFlowRecord};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze))
}

async fn analyze(
    State(state): State<AppState>,
    Json(records): Json<Vec<OptionsFlowRecord>>,
) -> Json<ApiResponse<FlowAnalysisResult>> {
    let result = state.flow_analyzer.analyze(&records, chrono::Utc::now());
    Json(ApiResponse::new(&state, result))
}
