use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use coldreach_core::content::{CreateDraftParams, DraftStatus, UpdateDraftParams};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateDraftRequest {
    pub content: String,
    pub model_id: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDraftRequest {
    pub content: String,
}

/// `POST /drafts`: Store a new draft in `GENERATED` state.
#[tracing::instrument(skip(state, req))]
pub async fn create_draft(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDraftRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.user_id.trim().is_empty() {
        return Err(AppError::InvalidField {
            field: "user_id",
            message: "user_id is required".to_string(),
        });
    }
    if let Some(model_id) = req.model_id.as_deref() {
        if state.content.get_model(model_id).await?.is_none() {
            return Err(AppError::NotFound("Model not found".to_string()));
        }
    }

    let draft = state
        .content
        .create_draft(CreateDraftParams {
            user_id: req.user_id,
            model_id: req.model_id,
            content: req.content,
            status: DraftStatus::Generated,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": { "draft_id": draft.id, "created": true }
        })),
    ))
}

/// `GET /drafts`: Every draft, newest first, flagged with whether it can
/// still be edited.
#[tracing::instrument(skip(state))]
pub async fn list_drafts(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let drafts = state.content.list_drafts().await?;
    let drafts: Vec<_> = drafts
        .iter()
        .map(|d| {
            json!({
                "draft_id": d.id,
                "content": d.content,
                "editable": d.is_editable(),
            })
        })
        .collect();
    Ok(Json(json!({ "data": { "drafts": drafts } })))
}

/// `GET /drafts/:draft_id`
#[tracing::instrument(skip(state))]
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Path(draft_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(draft) = state.content.get_draft(&draft_id).await? else {
        return Err(AppError::NotFound("Draft not found".to_string()));
    };
    Ok(Json(json!({
        "data": {
            "draft_id": draft.id,
            "content": draft.content,
            "status": draft.status,
            "last_edited": draft.updated_at,
        }
    })))
}

/// `PUT /drafts/:draft_id`: Replace the content and mark the draft `EDITED`.
/// An unknown id reports `updated: false` rather than 404.
#[tracing::instrument(skip(state, req))]
pub async fn update_draft(
    State(state): State<Arc<AppState>>,
    Path(draft_id): Path<String>,
    Json(req): Json<UpdateDraftRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .content
        .update_draft(
            &draft_id,
            UpdateDraftParams {
                content: Some(req.content),
                status: Some(DraftStatus::Edited),
                model_id: None,
            },
        )
        .await?;

    Ok(Json(json!({
        "data": { "draft_id": draft_id, "updated": updated.is_some() }
    })))
}

/// `DELETE /drafts/:draft_id`
#[tracing::instrument(skip(state))]
pub async fn delete_draft(
    State(state): State<Arc<AppState>>,
    Path(draft_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.content.delete_draft(&draft_id).await?;
    Ok(Json(json!({ "data": { "deleted": deleted } })))
}
