//! Price history endpoints.
//!
//! - GET /api/history/:symbol - stored bars, oldest first
//! - POST /api/history/:symbol - append bars
//! - DELETE /api/history/:symbol - forget the symbol

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use super::ApiResponse;
use crate::error::AppError;
use crate::types::OhlcBar;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub symbol: String,
    pub bars: Vec<OhlcBar>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    pub symbol: String,
    pub appended: usize,
    pub stored: usize,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/:symbol",
        get(get_history).post(append_history).delete(clear_history),
    )
}

fn validate_bar(bar: &OhlcBar) -> Result<(), AppError> {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return Err(AppError::BadRequest(format!(
            "bar at {} has a non-positive price",
            bar.time
        )));
    }
    if bar.high < bar.low {
        return Err(AppError::BadRequest(format!(
            "bar at {} has high below low",
            bar.time
        )));
    }
    Ok(())
}

async fn get_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<HistoryResponse>>, AppError> {
    let bars = state.history().bars(&symbol);
    if bars.is_empty() {
        return Err(AppError::NotFound(format!("No history for {}", symbol)));
    }
    Ok(Json(ApiResponse::new(
        &state,
        HistoryResponse {
            symbol: symbol.to_uppercase(),
            bars,
        },
    )))
}

async fn append_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(bars): Json<Vec<OhlcBar>>,
) -> Result<Json<ApiResponse<AppendResponse>>, AppError> {
    for bar in &bars {
        validate_bar(bar)?;
    }
    let appended = bars.len();
    let stored = state.history().extend(&symbol, bars);
    info!("Stored {} bars for {} ({} total)", appended, symbol, stored);

    Ok(Json(ApiResponse::new(
        &state,
        AppendResponse {
            symbol: symbol.to_uppercase(),
            appended,
            stored,
        },
    )))
}

async fn clear_history(State(state): State<AppState>, Path(symbol): Path<String>) -> StatusCode {
    state.history().clear(&symbol);
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> OhlcBar {
        OhlcBar {
            time: 0,
            open,
            high,
            low,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn test_validate_bar() {
        assert!(validate_bar(&bar(10.0, 11.0, 9.0, 10.5)).is_ok());
        assert!(validate_bar(&bar(10.0, 11.0, 9.0, 0.0)).is_err());
        assert!(validate_bar(&bar(10.0, 9.0, 11.0, 10.0)).is_err());
        assert!(validate_bar(&bar(f64::NAN, 11.0, 9.0, 10.0)).is_err());
    }
}
