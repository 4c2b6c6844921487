use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /health`: `200 {"status":"ok"}` while DuckDB answers `SELECT 1`,
/// `503 {"status":"degraded"}` otherwise. Both carry the crate version.
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, label) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, "Health check: DuckDB unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        status,
        Json(json!({
            "status": label,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
