use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use coldreach_core::analytics::{validate_rate, validate_timestamp};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    /// Defaults to now.
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RecordMetricRequest {
    pub open_rate: f64,
    pub conversion_rate: f64,
    /// Defaults to now.
    pub captured_at: Option<DateTime<Utc>>,
}

/// `POST /campaigns`: Register an email campaign that metrics can attach to.
#[tracing::instrument(skip(state))]
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidField {
            field: "name",
            message: "name is required".to_string(),
        });
    }

    let sent_at = validate_timestamp("sent_at", req.sent_at.unwrap_or_else(Utc::now))?;

    let campaign = state.metrics.create_campaign(name, sent_at).await?;
    tracing::info!(campaign_id = %campaign.id, "Campaign created");

    Ok((StatusCode::CREATED, Json(json!({ "data": campaign }))))
}

/// `POST /campaigns/:campaign_id/metrics`: Record one per-send observation.
#[tracing::instrument(skip(state))]
pub async fn record_metric(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<String>,
    Json(req): Json<RecordMetricRequest>,
) -> Result<impl IntoResponse, AppError> {
    let open_rate = validate_rate("open_rate", req.open_rate)?;
    let conversion_rate = validate_rate("conversion_rate", req.conversion_rate)?;
    let captured_at =
        validate_timestamp("captured_at", req.captured_at.unwrap_or_else(Utc::now))?;

    if state.metrics.get_campaign(&campaign_id).await?.is_none() {
        return Err(AppError::NotFound("Campaign not found".to_string()));
    }

    let metric = state
        .metrics
        .record_metric(
            &campaign_id,
            open_rate,
            conversion_rate,
            captured_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": metric }))))
}
