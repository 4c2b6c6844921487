use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use coldreach_core::error::CoreError;

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// A request field failed validation; `field` names it in the envelope.
    #[error("invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RateOutOfRange { field, .. } => AppError::InvalidField {
                field,
                message: err.to_string(),
            },
            CoreError::InvertedDateRange { .. } => AppError::InvalidField {
                field: "date_to",
                message: err.to_string(),
            },
            CoreError::TimestampOutOfRange { field, .. } => AppError::InvalidField {
                field,
                message: err.to_string(),
            },
            CoreError::UnknownVariant { .. } => AppError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.as_str(), None),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.as_str(),
                None,
            ),
            AppError::InvalidField { field, message } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message.as_str(),
                Some(*field),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.as_str(), None),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    None,
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            })),
        )
            .into_response()
    }
}
