use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use coldreach_core::config::Config;
use coldreach_duckdb::DuckDbBackend;
use coldreach_server::app::build_app;
use coldreach_server::state::AppState;

fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(db, Config::default()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request")
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("request");
    let status = response.status();
    (status, json_body(response).await)
}

fn content_request(model_type: &str) -> Value {
    json!({
        "user_id": "user_1",
        "content_parameters": {
            "intro": "Hello Sam,",
            "context": "We cut onboarding time in half.",
            "closing": "Best, Alex",
        },
        "model_type": model_type,
    })
}

async fn generate(app: &axum::Router) -> String {
    let (status, json) = send(
        app,
        request("POST", "/ai-writing/content", Some(content_request("GPT_4_TURBO"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["status"], "success");
    json["data"]["content_id"].as_str().expect("content id").to_string()
}

#[tokio::test]
async fn test_generate_content_joins_parameters_and_registers_model() {
    let (_state, app) = setup();
    let id = generate(&app).await;

    let (status, json) = send(&app, request("GET", &format!("/ai-writing/content/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(
        data["content"],
        "Hello Sam,\nWe cut onboarding time in half.\nBest, Alex"
    );
    assert_eq!(data["model_details"]["model_type"], "GPT_4_TURBO");
    assert_eq!(data["validation_status"], "Pending Validation");

    let (_, json) = send(&app, request("GET", "/models", None)).await;
    let models = json["data"]["models"].as_array().expect("models");
    assert_eq!(models.len(), 1);
    assert_eq!(
        models[0]["model_id"],
        data["model_details"]["model_id"]
    );

    // A second request reuses the registered model.
    generate(&app).await;
    let (_, json) = send(&app, request("GET", "/models", None)).await;
    assert_eq!(json["data"]["models"].as_array().expect("models").len(), 1);
}

#[tokio::test]
async fn test_generate_content_rejects_unknown_model_type() {
    let (_state, app) = setup();
    let (status, json) = send(
        &app,
        request("POST", "/ai-writing/content", Some(content_request("GPT_2"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_fetch_content_without_model_is_404() {
    let (_state, app) = setup();
    let (status, json) = send(
        &app,
        request(
            "POST",
            "/drafts",
            Some(json!({ "content": "Plain", "user_id": "user_1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["data"]["draft_id"].as_str().expect("id").to_string();

    let (status, _) = send(&app, request("GET", &format!("/ai-writing/content/{id}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, request("GET", "/ai-writing/content/drf_missing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_finalized_content_is_locked() {
    let (_state, app) = setup();
    let id = generate(&app).await;
    let uri = format!("/ai-writing/content/{id}");

    let (status, json) = send(
        &app,
        request("PATCH", &uri, Some(json!({ "new_content": "Tweaked" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "EDITED");

    let (status, _) = send(
        &app,
        request(
            "PATCH",
            &uri,
            Some(json!({ "new_content": "Final", "new_status": "FINALIZED" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(json["data"]["validation_status"], "Validated");
    assert_eq!(json["data"]["content"], "Final");

    let (status, json) = send(
        &app,
        request("PATCH", &uri, Some(json!({ "new_content": "Too late" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");

    let (status, _) = send(
        &app,
        request(
            "PATCH",
            "/ai-writing/content/drf_missing",
            Some(json!({ "new_content": "x" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_generated_content_confirms() {
    let (_state, app) = setup();
    let id = generate(&app).await;
    let uri = format!("/ai-writing/content/{id}");

    let (status, json) = send(&app, request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"]["confirmation"],
        format!("Content {id} successfully deleted.").as_str()
    );

    let (_, json) = send(&app, request("DELETE", &uri, None)).await;
    assert_eq!(
        json["data"]["confirmation"],
        "Content not found or already deleted."
    );
}

#[tokio::test]
async fn test_model_listing_and_selection() {
    let (state, app) = setup();
    state.db.seed_models().await.expect("seed");

    let (status, json) = send(&app, request("GET", "/models", None)).await;
    assert_eq!(status, StatusCode::OK);
    let models = json["data"]["models"].as_array().expect("models");
    assert_eq!(models.len(), 2);
    assert!(models.iter().all(|m| m["availability"] == true));
    assert!(models
        .iter()
        .any(|m| m["model_type"] == "CUSTOM_CHECKER" && m["name"] == "custom-checker"));

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/models/select",
            Some(json!({ "model_identifier": "GPT_4_TURBO" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["model_name"], "gpt-4-turbo");
    assert_eq!(json["data"]["selection_status"], "Selection successful");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/models/select",
            Some(json!({ "model_identifier": "gpt-4-turbo" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_model_feedback_round_trip() {
    let (_state, app) = setup();
    let (_, json) = send(
        &app,
        request(
            "POST",
            "/models/select",
            Some(json!({ "model_identifier": "GPT_4_TURBO" })),
        ),
    )
    .await;
    let model_id = json["data"]["model_id"].as_str().expect("model id").to_string();

    for (name, value, at) in [
        ("accuracy", 98.5, "2023-01-15T00:00:00Z"),
        ("user_satisfaction", 95.0, "2023-01-25T00:00:00Z"),
        ("accuracy", 91.0, "2023-03-01T00:00:00Z"),
    ] {
        let (status, _) = send(
            &app,
            request(
                "POST",
                &format!("/models/{model_id}/feedback"),
                Some(json!({ "metric_name": name, "value": value, "recorded_at": at })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, json) = send(
        &app,
        request(
            "GET",
            &format!(
                "/models/feedback?model_id={model_id}&date_from=2023-01-01&date_to=2023-02-01&feedback_type=accuracy"
            ),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["model_name"], "gpt-4-turbo");
    let details = data["feedback_details"].as_array().expect("details");
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["metric_name"], "accuracy");
    assert_eq!(details[0]["value"], 98.5);
    assert_eq!(details[0]["timestamp"], "2023-01-15T00:00:00Z");

    let (status, _) = send(
        &app,
        request(
            "GET",
            "/models/feedback?model_id=mdl_missing&date_from=2023-01-01&date_to=2023-02-01&feedback_type=accuracy",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/models/mdl_missing/feedback",
            Some(json!({ "metric_name": "accuracy", "value": 1.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
