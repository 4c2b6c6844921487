//! Quality-check endpoints. A "validation" is a draft under review; its id is
//! the draft id.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use coldreach_core::content::{
    validate_content as check_content, DraftStatus, ModelType, Page, UpdateDraftParams,
};

use crate::{error::AppError, state::AppState};

/// Fixed accuracy reported for finalized drafts.
const FINALIZED_ACCURACY: f64 = 0.9;

#[derive(Debug, Deserialize)]
pub struct ValidateContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ListValidationsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateValidationRequest {
    pub new_content: String,
    pub new_model_type: Option<String>,
    pub additional_notes: Option<String>,
}

/// `POST /quality-check/validate`: Run the static quality rules. Errors only
/// fail the content while a `CUSTOM_CHECKER` model is registered.
#[tracing::instrument(skip(state, req))]
pub async fn validate_content(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let checker = state
        .content
        .find_model_by_type(ModelType::CustomChecker)
        .await?;
    let validation = check_content(&req.content, checker.is_some());
    Ok(Json(json!({ "data": validation })))
}

/// `GET /quality-check/status/:validation_id`
#[tracing::instrument(skip(state))]
pub async fn get_validation_status(
    State(state): State<Arc<AppState>>,
    Path(validation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(draft) = state.content.get_draft(&validation_id).await? else {
        return Err(AppError::NotFound("Validation not found".to_string()));
    };

    let mut body = json!({ "validation_status": draft.status });
    if draft.status == DraftStatus::Finalized {
        let errors: Vec<String> = state
            .content
            .latest_edit(&draft.id)
            .await?
            .map(|edit| edit.content)
            .into_iter()
            .collect();
        body["validation_results"] = json!({
            "accuracy": FINALIZED_ACCURACY,
            "errors": errors,
        });
    }

    Ok(Json(json!({ "data": body })))
}

/// `GET /quality-check/list`: Drafts awaiting review (`EDITED`), newest first.
#[tracing::instrument(skip(state))]
pub async fn list_validations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListValidationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.map(|l| l.clamp(1, Page::MAX_LIMIT));
    let offset = query.offset.map(|o| o.max(0));

    let drafts = state
        .content
        .list_drafts_by_status(DraftStatus::Edited, limit, offset)
        .await?;
    let validations: Vec<_> = drafts
        .iter()
        .map(|d| {
            json!({
                "validation_id": d.id,
                "submission_time": d.created_at,
                "status": d.status,
            })
        })
        .collect();

    Ok(Json(json!({ "data": { "validations": validations } })))
}

fn update_failed(validation_id: &str, error: &str) -> Json<Value> {
    Json(json!({
        "data": {
            "success": false,
            "updated_validation_id": validation_id,
            "updated_details": { "error": error },
        }
    }))
}

/// `PUT /quality-check/update/:validation_id`: Replace the content, optionally
/// reassign the model and attach a reviewer note.
///
/// Lookup failures are reported in the body with `success: false`.
#[tracing::instrument(skip(state, req))]
pub async fn update_validation(
    State(state): State<Arc<AppState>>,
    Path(validation_id): Path<String>,
    Json(req): Json<UpdateValidationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.content.get_draft(&validation_id).await?.is_none() {
        return Ok(update_failed(
            &validation_id,
            "Validation with the provided ID does not exist.",
        ));
    }

    let new_model_type = req
        .new_model_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let mut model_id = None;
    if let Some(raw) = new_model_type {
        let model = match raw.parse::<ModelType>() {
            Ok(model_type) => state.content.find_model_by_type(model_type).await?,
            Err(_) => None,
        };
        match model {
            Some(model) => model_id = Some(model.id),
            None => {
                return Ok(update_failed(
                    &validation_id,
                    "Specified model type does not exist.",
                ))
            }
        }
    }

    let updated = state
        .content
        .update_draft(
            &validation_id,
            UpdateDraftParams {
                content: Some(req.new_content.clone()),
                status: None,
                model_id,
            },
        )
        .await?;
    if updated.is_none() {
        return Ok(update_failed(
            &validation_id,
            "Validation with the provided ID does not exist.",
        ));
    }

    let notes = req
        .additional_notes
        .as_deref()
        .filter(|n| !n.trim().is_empty());
    if let Some(notes) = notes {
        state.content.add_edit(&validation_id, notes).await?;
    }

    Ok(Json(json!({
        "data": {
            "success": true,
            "updated_validation_id": validation_id,
            "updated_details": {
                "new_content": req.new_content,
                "new_model_type": new_model_type.unwrap_or("Unchanged"),
                "additional_notes": notes.unwrap_or("No additional notes provided"),
            },
        }
    })))
}

/// `DELETE /quality-check/delete/:validation_id`
#[tracing::instrument(skip(state))]
pub async fn delete_validation(
    State(state): State<Arc<AppState>>,
    Path(validation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.content.delete_draft(&validation_id).await?;
    let message = if deleted {
        "Validation successfully deleted."
    } else {
        "Validation not found."
    };
    Ok(Json(json!({
        "data": { "success": deleted, "message": message }
    })))
}
