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

async fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.seed_models().await.expect("seed models");
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

async fn create_draft(app: &axum::Router, content: &str) -> String {
    let (status, json) = send(
        app,
        request(
            "POST",
            "/drafts",
            Some(json!({ "content": content, "user_id": "user_1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["created"], true);
    json["data"]["draft_id"].as_str().expect("draft id").to_string()
}

#[tokio::test]
async fn test_create_and_fetch_draft() {
    let (_state, app) = setup().await;
    let id = create_draft(&app, "First pass").await;

    let (status, json) = send(&app, request("GET", &format!("/drafts/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["draft_id"], id.as_str());
    assert_eq!(data["content"], "First pass");
    assert_eq!(data["status"], "GENERATED");
    assert!(data["last_edited"].is_string());

    let (status, _) = send(&app, request("GET", "/drafts/drf_missing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_draft_with_unknown_model_is_404() {
    let (_state, app) = setup().await;
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/drafts",
            Some(json!({ "content": "x", "user_id": "user_1", "model_id": "mdl_missing" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_draft_marks_edited() {
    let (_state, app) = setup().await;
    let id = create_draft(&app, "Draft").await;

    let (status, json) = send(
        &app,
        request(
            "PUT",
            &format!("/drafts/{id}"),
            Some(json!({ "content": "Revised" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["updated"], true);

    let (_, json) = send(&app, request("GET", &format!("/drafts/{id}"), None)).await;
    assert_eq!(json["data"]["content"], "Revised");
    assert_eq!(json["data"]["status"], "EDITED");

    let (status, json) = send(
        &app,
        request(
            "PUT",
            "/drafts/drf_missing",
            Some(json!({ "content": "Revised" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["updated"], false);
}

#[tokio::test]
async fn test_list_drafts_reports_editable() {
    let (_state, app) = setup().await;
    let open = create_draft(&app, "Open").await;

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/ai-writing/content",
            Some(json!({
                "user_id": "user_1",
                "content_parameters": { "intro": "Hi", "context": "We help", "closing": "Bye" },
                "model_type": "GPT_4_TURBO",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let finalized = json["data"]["content_id"].as_str().expect("id").to_string();
    let (status, _) = send(
        &app,
        request(
            "PATCH",
            &format!("/ai-writing/content/{finalized}"),
            Some(json!({ "new_content": "Final", "new_status": "FINALIZED" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, request("GET", "/drafts", None)).await;
    assert_eq!(status, StatusCode::OK);
    let drafts = json["data"]["drafts"].as_array().expect("drafts");
    assert_eq!(drafts.len(), 2);
    let editable = |id: &str| {
        drafts
            .iter()
            .find(|d| d["draft_id"] == id)
            .map(|d| d["editable"].clone())
    };
    assert_eq!(editable(open.as_str()), Some(json!(true)));
    assert_eq!(editable(finalized.as_str()), Some(json!(false)));
}

#[tokio::test]
async fn test_delete_draft_removes_edits() {
    let (state, app) = setup().await;
    let id = create_draft(&app, "Doomed").await;
    state
        .content
        .add_edit(&id, "reviewer note")
        .await
        .expect("edit");

    let (status, json) = send(&app, request("DELETE", &format!("/drafts/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["deleted"], true);
    assert!(state
        .content
        .latest_edit(&id)
        .await
        .expect("latest")
        .is_none());

    let (_, json) = send(&app, request("DELETE", &format!("/drafts/{id}"), None)).await;
    assert_eq!(json["data"]["deleted"], false);
}
