use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use coldreach_core::content::{
    ContentParameters, CreateDraftParams, DraftStatus, ModelType, UpdateDraftParams,
};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub user_id: String,
    pub content_parameters: ContentParameters,
    pub model_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentUpdateRequest {
    pub new_content: String,
    pub new_status: Option<String>,
}

/// `POST /ai-writing/content`: Compose a draft from the writer's parameters
/// and attribute it to a model of the requested type.
///
/// No model is invoked: the draft content is the three parameter sections
/// joined by newlines.
#[tracing::instrument(skip(state, req))]
pub async fn create_content_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let model_type: ModelType = req.model_type.parse()?;
    if req.user_id.trim().is_empty() {
        return Err(AppError::InvalidField {
            field: "user_id",
            message: "user_id is required".to_string(),
        });
    }

    let model = state.content.find_or_create_model(model_type).await?;
    let draft = state
        .content
        .create_draft(CreateDraftParams {
            user_id: req.user_id,
            model_id: Some(model.id),
            content: req.content_parameters.compose(),
            status: DraftStatus::Generated,
        })
        .await?;
    tracing::info!(content_id = %draft.id, "Generated content stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": { "content_id": draft.id, "status": "success" }
        })),
    ))
}

/// `GET /ai-writing/content/:content_id`
#[tracing::instrument(skip(state))]
pub async fn fetch_generated_content(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found =
        || AppError::NotFound("No draft or associated AI model for this content".to_string());

    let draft = state
        .content
        .get_draft(&content_id)
        .await?
        .ok_or_else(not_found)?;
    let model_id = draft.model_id.as_deref().ok_or_else(not_found)?;
    let model = state
        .content
        .get_model(model_id)
        .await?
        .ok_or_else(not_found)?;

    let validation_status = if draft.status == DraftStatus::Finalized {
        "Validated"
    } else {
        "Pending Validation"
    };

    Ok(Json(json!({
        "data": {
            "content": draft.content,
            "model_details": {
                "model_id": model.id,
                "model_type": model.model_type,
            },
            "validation_status": validation_status,
        }
    })))
}

/// `PATCH /ai-writing/content/:content_id`: Edit generated content.
///
/// Finalized content is locked and answers 409. `new_status` defaults to
/// `EDITED`.
#[tracing::instrument(skip(state, req))]
pub async fn update_generated_content(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<String>,
    Json(req): Json<ContentUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = match req.new_status.as_deref() {
        Some(raw) => raw.parse::<DraftStatus>()?,
        None => DraftStatus::Edited,
    };

    let Some(draft) = state.content.get_draft(&content_id).await? else {
        return Err(AppError::NotFound("Content not found".to_string()));
    };
    if !draft.is_editable() {
        return Err(AppError::Conflict(
            "Content is finalized and can no longer be edited".to_string(),
        ));
    }

    let updated = state
        .content
        .update_draft(
            &content_id,
            UpdateDraftParams {
                content: Some(req.new_content),
                status: Some(status),
                model_id: None,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Content not found".to_string()))?;

    Ok(Json(json!({
        "data": {
            "content_id": updated.id,
            "content": updated.content,
            "status": updated.status,
            "update_status": "success",
        }
    })))
}

/// `DELETE /ai-writing/content/:content_id`
#[tracing::instrument(skip(state))]
pub async fn delete_generated_content(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let confirmation = if state.content.delete_draft(&content_id).await? {
        format!("Content {content_id} successfully deleted.")
    } else {
        "Content not found or already deleted.".to_string()
    };
    Ok(Json(json!({ "data": { "confirmation": confirmation } })))
}
