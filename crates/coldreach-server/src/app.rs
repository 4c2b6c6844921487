use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// `TraceLayer` is outermost so CORS preflights are logged too. Allowed
/// origins come from `COLDREACH_CORS_ORIGINS`; an empty list allows any.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(routes::health::health))
        // Analytics
        .route("/analytics", get(routes::analytics::get_analytics))
        .route(
            "/analytics/emails",
            post(routes::analytics::create_email_analysis),
        )
        .route(
            "/analytics/emails/{email_id}",
            get(routes::analytics::get_email_performance)
                .patch(routes::analytics::update_email_analysis)
                .delete(routes::analytics::delete_email_analytics),
        )
        .route("/campaigns", post(routes::campaigns::create_campaign))
        .route(
            "/campaigns/{campaign_id}/metrics",
            post(routes::campaigns::record_metric),
        )
        // Templates
        .route(
            "/templates",
            get(routes::templates::list_templates).post(routes::templates::create_template),
        )
        .route(
            "/templates/{template_id}",
            get(routes::templates::get_template)
                .put(routes::templates::update_template)
                .delete(routes::templates::delete_template),
        )
        // Drafts
        .route(
            "/drafts",
            get(routes::drafts::list_drafts).post(routes::drafts::create_draft),
        )
        .route(
            "/drafts/{draft_id}",
            get(routes::drafts::get_draft)
                .put(routes::drafts::update_draft)
                .delete(routes::drafts::delete_draft),
        )
        // AI writing
        .route(
            "/ai-writing/content",
            post(routes::content::create_content_request),
        )
        .route(
            "/ai-writing/content/{content_id}",
            get(routes::content::fetch_generated_content)
                .patch(routes::content::update_generated_content)
                .delete(routes::content::delete_generated_content),
        )
        // Models
        .route("/models", get(routes::models::list_models))
        .route("/models/select", post(routes::models::select_model))
        .route("/models/feedback", get(routes::models::get_model_feedback))
        .route(
            "/models/{model_id}/feedback",
            post(routes::models::record_model_feedback),
        )
        // Quality check
        .route(
            "/quality-check/validate",
            post(routes::quality_check::validate_content),
        )
        .route(
            "/quality-check/status/{validation_id}",
            get(routes::quality_check::get_validation_status),
        )
        .route(
            "/quality-check/list",
            get(routes::quality_check::list_validations),
        )
        .route(
            "/quality-check/update/{validation_id}",
            put(routes::quality_check::update_validation),
        )
        .route(
            "/quality-check/delete/{validation_id}",
            delete(routes::quality_check::delete_validation),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Any origin when `origins` is empty, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
