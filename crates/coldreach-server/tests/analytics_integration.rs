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

fn setup() -> axum::Router {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    build_app(Arc::new(AppState::new(db, Config::default())))
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

async fn create_campaign(app: &axum::Router, name: &str, sent_at: &str) -> String {
    let (status, json) = send(
        app,
        request(
            "POST",
            "/campaigns",
            Some(json!({ "name": name, "sent_at": sent_at })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["id"].as_str().expect("campaign id").to_string()
}

async fn record(app: &axum::Router, campaign_id: &str, open: f64, conv: f64, at: &str) {
    let (status, _) = send(
        app,
        request(
            "POST",
            &format!("/campaigns/{campaign_id}/metrics"),
            Some(json!({ "open_rate": open, "conversion_rate": conv, "captured_at": at })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn approx(value: &Value, expected: f64) -> bool {
    value
        .as_f64()
        .is_some_and(|v| (v - expected).abs() < 1e-9)
}

#[tokio::test]
async fn test_unknown_email_returns_zero_summary() {
    let app = setup();
    let (status, json) = send(&app, request("GET", "/analytics/emails/cmp_unknown", None)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &json["data"];
    assert_eq!(data["totalCount"], 0);
    assert_eq!(data["averageOpenRate"], 0.0);
    assert_eq!(data["averageConversionRate"], 0.0);
    assert_eq!(data["averageClickThroughRate"], 0.0);
    assert_eq!(data["trend"], json!([]));
}

#[tokio::test]
async fn test_email_performance_aggregates_and_orders_trend() {
    let app = setup();
    let id = create_campaign(&app, "Launch", "2024-03-01T09:00:00Z").await;
    record(&app, &id, 0.5, 0.2, "2024-03-02T00:00:00Z").await;
    record(&app, &id, 0.3, 0.4, "2024-03-01T12:00:00Z").await;

    let (status, json) = send(&app, request("GET", &format!("/analytics/emails/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &json["data"];
    assert_eq!(data["totalCount"], 2);
    assert!(approx(&data["averageOpenRate"], 0.4));
    assert!(approx(&data["averageConversionRate"], 0.3));
    assert!(approx(&data["averageClickThroughRate"], 0.35));

    let trend = data["trend"].as_array().expect("trend");
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0]["timestamp"], "2024-03-01T12:00:00Z");
    assert!(approx(&trend[0]["value"], 0.3));
    assert_eq!(trend[1]["timestamp"], "2024-03-02T00:00:00Z");
    assert!(approx(&trend[1]["value"], 0.5));
}

#[tokio::test]
async fn test_global_analytics_with_date_range() {
    let app = setup();
    let a = create_campaign(&app, "A", "2024-01-01T00:00:00Z").await;
    let b = create_campaign(&app, "B", "2024-01-01T00:00:00Z").await;
    record(&app, &a, 0.2, 0.1, "2024-01-03T10:00:00Z").await;
    record(&app, &b, 0.6, 0.3, "2024-01-10T10:00:00Z").await;

    let (_, all) = send(&app, request("GET", "/analytics", None)).await;
    assert_eq!(all["data"]["totalCount"], 2);

    let (status, ranged) = send(
        &app,
        request(
            "GET",
            "/analytics?date_from=2024-01-05&date_to=2024-01-10",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ranged["data"]["totalCount"], 1);
    assert!(approx(&ranged["data"]["averageOpenRate"], 0.6));
}

#[tokio::test]
async fn test_analytics_rejects_bad_ranges() {
    let app = setup();

    let (status, json) = send(&app, request("GET", "/analytics?date_from=2024-01-05", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["field"], "date_to");

    let (status, json) = send(
        &app,
        request(
            "GET",
            "/analytics?date_from=2024-02-01&date_to=2024-01-01",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");

    let (status, _) = send(
        &app,
        request("GET", "/analytics?date_from=jan&date_to=feb", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_rejects_out_of_range_rate() {
    let app = setup();
    let id = create_campaign(&app, "Fix", "2024-01-01T00:00:00Z").await;
    record(&app, &id, 0.2, 0.1, "2024-01-02T00:00:00Z").await;

    let (status, json) = send(
        &app,
        request(
            "PATCH",
            &format!("/analytics/emails/{id}"),
            Some(json!({ "open_rate": 1.5 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["field"], "open_rate");
}

#[tokio::test]
async fn test_patch_corrects_first_metric() {
    let app = setup();
    let id = create_campaign(&app, "Fix", "2024-01-01T00:00:00Z").await;
    record(&app, &id, 0.2, 0.1, "2024-01-02T00:00:00Z").await;
    record(&app, &id, 0.4, 0.1, "2024-01-03T00:00:00Z").await;

    let (status, json) = send(
        &app,
        request(
            "PATCH",
            &format!("/analytics/emails/{id}"),
            Some(json!({ "conversion_rate": 0.25 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["update_status"], "Success: Metrics updated");
    assert!(approx(&json["data"]["open_rate"], 0.2));
    assert!(approx(&json["data"]["conversion_rate"], 0.25));

    let (_, json) = send(
        &app,
        request("PATCH", &format!("/analytics/emails/{id}"), Some(json!({}))),
    )
    .await;
    assert_eq!(json["data"]["update_status"], "No change: No updates provided");

    let (status, _) = send(
        &app,
        request(
            "PATCH",
            "/analytics/emails/cmp_unknown",
            Some(json!({ "open_rate": 0.5 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_email_analytics() {
    let app = setup();
    let id = create_campaign(&app, "Gone", "2024-01-01T00:00:00Z").await;
    record(&app, &id, 0.2, 0.1, "2024-01-02T00:00:00Z").await;
    record(&app, &id, 0.3, 0.1, "2024-01-03T00:00:00Z").await;

    let (status, json) = send(&app, request("DELETE", &format!("/analytics/emails/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "success");
    assert_eq!(json["data"]["deleted"], 2);

    let (_, json) = send(&app, request("GET", &format!("/analytics/emails/{id}"), None)).await;
    assert_eq!(json["data"]["totalCount"], 0);
}

#[tokio::test]
async fn test_campaign_analysis_over_sent_range() {
    let app = setup();
    let inside = create_campaign(&app, "Inside", "2024-01-15T10:00:00Z").await;
    let outside = create_campaign(&app, "Outside", "2024-03-01T10:00:00Z").await;
    record(&app, &inside, 0.4, 0.2, "2024-01-16T00:00:00Z").await;
    record(&app, &inside, 0.6, 0.4, "2024-01-17T00:00:00Z").await;
    record(&app, &outside, 0.9, 0.9, "2024-03-02T00:00:00Z").await;

    let (status, json) = send(
        &app,
        request(
            "POST",
            "/analytics/emails",
            Some(json!({ "date_from": "2024-01-01", "date_to": "2024-01-31" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["email_count"], 2);
    assert!(approx(&data["average_open_rate"], 0.5));
    assert!(approx(&data["average_conversion_rate"], 0.3));
    let details = data["detailed_metrics"].as_array().expect("details");
    assert!(details.iter().all(|d| d["campaign_id"] == inside.as_str()));

    let (_, json) = send(
        &app,
        request(
            "POST",
            "/analytics/emails",
            Some(json!({
                "date_from": "2024-01-01",
                "date_to": "2024-12-31",
                "campaign_id": outside,
            })),
        ),
    )
    .await;
    assert_eq!(json["data"]["email_count"], 1);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/analytics/emails",
            Some(json!({ "date_from": "2024-02-01", "date_to": "2024-01-01" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_metric_validates_campaign_and_rates() {
    let app = setup();

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/campaigns/cmp_unknown/metrics",
            Some(json!({ "open_rate": 0.5, "conversion_rate": 0.1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = create_campaign(&app, "Rates", "2024-01-01T00:00:00Z").await;
    let (status, json) = send(
        &app,
        request(
            "POST",
            &format!("/campaigns/{id}/metrics"),
            Some(json!({ "open_rate": 0.5, "conversion_rate": -0.1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["field"], "conversion_rate");

    let (status, _) = send(
        &app,
        request("POST", "/campaigns", Some(json!({ "name": "  " }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_out_of_range_years_are_client_errors() {
    let app = setup();

    let (status, json) = send(
        &app,
        request("GET", "/analytics?date_from=2024-01-01&date_to=9999-12-31", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["field"], "date_to");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/campaigns",
            Some(json!({ "name": "Future", "sent_at": "+10000-01-01T00:00:00Z" })),
        ),
    )
    .await;
    assert!(status.is_client_error(), "{status}");

    let id = create_campaign(&app, "Now", "2024-01-01T00:00:00Z").await;
    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/campaigns/{id}/metrics"),
            Some(json!({
                "open_rate": 0.5,
                "conversion_rate": 0.1,
                "captured_at": "+10000-01-01T00:00:00Z",
            })),
        ),
    )
    .await;
    assert!(status.is_client_error(), "{status}");
}
