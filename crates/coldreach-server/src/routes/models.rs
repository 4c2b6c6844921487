use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use coldreach_core::analytics::validate_timestamp;
use coldreach_core::content::ModelType;

use crate::{error::AppError, routes::required_range, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    pub model_identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelFeedbackQuery {
    pub model_id: String,
    pub date_from: String,
    pub date_to: String,
    pub feedback_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordFeedbackRequest {
    pub metric_name: String,
    pub value: f64,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// `GET /models`
#[tracing::instrument(skip(state))]
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let models = state.content.list_models().await?;
    let models: Vec<_> = models
        .iter()
        .map(|m| {
            json!({
                "model_id": m.id,
                "name": m.name,
                "description": m.description,
                "model_type": m.model_type,
                "availability": m.available,
            })
        })
        .collect();
    Ok(Json(json!({ "data": { "models": models } })))
}

/// `POST /models/select`: Resolve a model type to a registered model,
/// registering one on first use.
#[tracing::instrument(skip(state))]
pub async fn select_model(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectModelRequest>,
) -> Result<impl IntoResponse, AppError> {
    let model_type: ModelType = req.model_identifier.parse()?;
    let model = state.content.find_or_create_model(model_type).await?;
    tracing::info!(model_id = %model.id, model_type = %model_type, "Model selected");

    Ok(Json(json!({
        "data": {
            "model_id": model.id,
            "model_name": model.name,
            "selection_status": "Selection successful",
        }
    })))
}

/// `GET /models/feedback`: Recorded feedback of one kind for a model within
/// a date range.
#[tracing::instrument(skip(state))]
pub async fn get_model_feedback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelFeedbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = required_range(&query.date_from, &query.date_to)?;
    let Some(model) = state.content.get_model(&query.model_id).await? else {
        return Err(AppError::NotFound("Model not found".to_string()));
    };

    let feedback = state
        .content
        .list_model_feedback(&model.id, &query.feedback_type, range)
        .await?;
    let details: Vec<_> = feedback
        .iter()
        .map(|f| {
            json!({
                "metric_name": f.metric_name,
                "value": f.value,
                "timestamp": f.recorded_at,
            })
        })
        .collect();

    Ok(Json(json!({
        "data": {
            "model_id": model.id,
            "model_name": model.name,
            "feedback_details": details,
        }
    })))
}

/// `POST /models/:model_id/feedback`
#[tracing::instrument(skip(state))]
pub async fn record_model_feedback(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
    Json(req): Json<RecordFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    let metric_name = req.metric_name.trim();
    if metric_name.is_empty() {
        return Err(AppError::InvalidField {
            field: "metric_name",
            message: "metric_name is required".to_string(),
        });
    }
    if !req.value.is_finite() {
        return Err(AppError::InvalidField {
            field: "value",
            message: "value must be a finite number".to_string(),
        });
    }
    let recorded_at =
        validate_timestamp("recorded_at", req.recorded_at.unwrap_or_else(Utc::now))?;
    if state.content.get_model(&model_id).await?.is_none() {
        return Err(AppError::NotFound("Model not found".to_string()));
    }

    let feedback = state
        .content
        .record_model_feedback(
            &model_id,
            metric_name,
            req.value,
            recorded_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": feedback }))))
}
