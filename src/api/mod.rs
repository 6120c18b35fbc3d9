pub mod analysis;
pub mod flow;
pub mod health;
pub mod history;
pub mod learning;
pub mod recommendations;

use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeta {
    /// Scoring path that served the request.
    pub scorer: &'static str,
    /// Unix timestamp (milliseconds).
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    pub fn new(state: &AppState, data: T) -> Self {
        Self {
            data,
            meta: ApiMeta {
                scorer: state.config.scorer.as_str(),
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        }
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/analysis", analysis::router())
        .nest("/api/recommendations", recommendations::router())
        .nest("/api/options-flow", flow::router())
        .nest("/api/history", history::router())
        .nest("/api", learning::router())
}

/// Full application with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
