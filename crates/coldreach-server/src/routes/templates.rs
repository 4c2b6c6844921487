use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use coldreach_core::content::{
    total_pages, CreateTemplateParams, Page, SortOrder, Template, TemplateQuery,
    UpdateTemplateParams,
};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
}

fn template_summary(template: &Template) -> Value {
    json!({
        "template_id": template.id,
        "title": template.title,
        "content": template.content,
        "category": template.category,
    })
}

fn require_text(field: &'static str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidField {
            field,
            message: format!("{field} is required"),
        });
    }
    Ok(())
}

/// `POST /templates`: Create a template. Category comes from
/// `metadata.category` and falls back to `General`.
#[tracing::instrument(skip(state, req))]
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_text("title", &req.title)?;
    require_text("content", &req.content)?;

    let template = state
        .content
        .create_template(CreateTemplateParams::from_metadata(
            req.title,
            req.content,
            &req.metadata,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": {
                "id": template.id,
                "title": template.title,
                "content": template.content,
                "category": template.category,
                "created_at": template.created_at,
            }
        })),
    ))
}

/// `GET /templates`: One page of templates ordered by creation time.
#[tracing::instrument(skip(state))]
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::new(query.page, query.limit, state.config.default_page_size);
    let template_query = TemplateQuery {
        page,
        category: query.category.filter(|c| !c.trim().is_empty()),
        sort: SortOrder::parse(query.sort_by.as_deref()),
    };

    let (templates, total) = state.content.list_templates(&template_query).await?;

    Ok(Json(json!({
        "data": {
            "templates": templates.iter().map(template_summary).collect::<Vec<_>>(),
            "total_templates": total,
            "current_page": page.number,
            "total_pages": total_pages(total, page.limit),
        }
    })))
}

/// `GET /templates/:template_id`
#[tracing::instrument(skip(state))]
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    match state.content.get_template(&template_id).await? {
        Some(template) => Ok(Json(json!({ "data": template }))),
        None => Err(AppError::NotFound("Template not found".to_string())),
    }
}

/// `PUT /templates/:template_id`: Replace title and content; category only
/// when supplied.
#[tracing::instrument(skip(state, req))]
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_text("title", &req.title)?;
    require_text("content", &req.content)?;

    let updated = state
        .content
        .update_template(
            &template_id,
            UpdateTemplateParams {
                title: req.title,
                content: req.content,
                category: req.category,
            },
        )
        .await?;

    match updated {
        Some(template) => Ok(Json(json!({
            "data": { "template": template_summary(&template) }
        }))),
        None => Err(AppError::NotFound("Template not found".to_string())),
    }
}

/// `DELETE /templates/:template_id`
#[tracing::instrument(skip(state))]
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.content.delete_template(&template_id).await? {
        return Err(AppError::NotFound("Template not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
