use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use coldreach_core::analytics::{aggregate, analyze_campaigns, MetricCorrection};

use crate::{
    error::AppError,
    routes::{optional_range, required_range},
    state::AppState,
};

const UPDATED: &str = "Success: Metrics updated";
const UNCHANGED: &str = "No change: No updates provided";

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailAnalysisRequest {
    pub date_from: String,
    pub date_to: String,
    pub campaign_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmailAnalysisRequest {
    pub open_rate: Option<f64>,
    pub conversion_rate: Option<f64>,
}

/// `GET /analytics`: Summary over every recorded metric, optionally limited
/// to those captured between `date_from` and `date_to` (inclusive days).
#[tracing::instrument(skip(state))]
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = optional_range(query.date_from.as_deref(), query.date_to.as_deref())?;
    let records = state.metrics.find_all_metrics(range).await?;
    Ok(Json(json!({ "data": aggregate(&records) })))
}

/// `GET /analytics/emails/:email_id`: Summary for one campaign. An unknown
/// campaign has no metrics and yields the zero summary.
#[tracing::instrument(skip(state))]
pub async fn get_email_performance(
    State(state): State<Arc<AppState>>,
    Path(email_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let records = state.metrics.find_metrics_by_owner(&email_id).await?;
    Ok(Json(json!({ "data": aggregate(&records) })))
}

/// `POST /analytics/emails`: Per-send breakdown of campaigns sent in a range.
#[tracing::instrument(skip(state))]
pub async fn create_email_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailAnalysisRequest>,
) -> Result<impl IntoResponse, AppError> {
    let range = required_range(&req.date_from, &req.date_to)?;
    let campaign_id = req.campaign_id.as_deref().filter(|id| !id.is_empty());
    let campaigns = state
        .metrics
        .find_campaigns_sent_between(range, campaign_id)
        .await?;
    Ok(Json(json!({ "data": analyze_campaigns(&campaigns) })))
}

/// `PATCH /analytics/emails/:email_id`: Correct the campaign's first metric.
#[tracing::instrument(skip(state))]
pub async fn update_email_analysis(
    State(state): State<Arc<AppState>>,
    Path(email_id): Path<String>,
    Json(req): Json<UpdateEmailAnalysisRequest>,
) -> Result<impl IntoResponse, AppError> {
    let correction = MetricCorrection {
        open_rate: req.open_rate,
        conversion_rate: req.conversion_rate,
    };
    correction.validate()?;

    let update_status = if correction.is_empty() {
        UNCHANGED
    } else {
        UPDATED
    };
    let Some(metric) = state.metrics.correct_metric(&email_id, correction).await? else {
        return Err(AppError::NotFound(
            "Email campaign has no metrics".to_string(),
        ));
    };

    Ok(Json(json!({
        "data": {
            "email_id": email_id,
            "open_rate": metric.open_rate,
            "conversion_rate": metric.conversion_rate,
            "update_status": update_status,
        }
    })))
}

/// `DELETE /analytics/emails/:email_id`: Drop every metric of the campaign.
/// Deleting from a campaign with no metrics still succeeds.
#[tracing::instrument(skip(state))]
pub async fn delete_email_analytics(
    State(state): State<Arc<AppState>>,
    Path(email_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.metrics.delete_metrics_by_owner(&email_id).await?;
    tracing::info!(email_id = %email_id, deleted, "Email analytics deleted");
    Ok(Json(json!({
        "data": {
            "status": "success",
            "message": "Email analytics data successfully deleted.",
            "deleted": deleted,
        }
    })))
}
