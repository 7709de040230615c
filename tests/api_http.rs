// tests/api_http.rs

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use labor_order_analyzer::api::{create_router, AppState};
use labor_order_analyzer::ledger::Ledger;
use labor_order_analyzer::storage::MemoryStore;
use labor_order_analyzer::EngineConfig;
use tower::ServiceExt; // for `oneshot` (tower 0.5 with features=["util"])

fn app() -> Router {
    let ledger = Arc::new(Ledger::open(Arc::new(MemoryStore::new())).unwrap());
    let config = Arc::new(EngineConfig::default());
    create_router(AppState { ledger, config })
}

fn ingest_req(source: &str, text: &str, observed_at: Option<&str>) -> Request<Body> {
    let body = serde_json::json!({
        "source_id": source,
        "display_name": "Day Shifts",
        "text": text,
        "observed_at": observed_at,
    });
    Request::builder()
        .method("POST")
        .uri("/ingest")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const POSTING: &str =
    "• Moscow: loaders\nAddress: 👉 Main St 1\nNeeded 3/9\nPay: 600 per hour\nStart: tomorrow 8 AM";

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let resp = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn ingest_then_report_day_range() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(ingest_req("42", POSTING, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("\"stored\":true"));

    let resp = app
        .clone()
        .oneshot(
            Request::get("/report?source=42&range=day")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let s = body_string(resp).await;
    assert!(s.contains("\"status\":\"ok\""));
    assert!(s.contains("600 per hour (1 requests)"));
    assert!(s.contains("Main St 1"));
}

#[tokio::test]
async fn chat_noise_is_swallowed_not_an_error() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(ingest_req("42", "anyone around tomorrow?", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("\"stored\":false"));

    // nothing was recorded
    let resp = app
        .oneshot(Request::get("/sources").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_string(resp).await, "[]");
}

#[tokio::test]
async fn unknown_source_reports_empty() {
    let resp = app()
        .oneshot(
            Request::get("/report?source=nope&range=week")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("\"status\":\"empty\""));
}

#[tokio::test]
async fn invalid_selectors_are_rejected_without_state_change() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(
            Request::get("/report?source=42&range=month")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = app
        .clone()
        .oneshot(
            Request::get("/report?source=42&range=day&format=xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = app
        .clone()
        .oneshot(
            Request::get("/export?source=42&start=2026-08-01&end=29-08-2026")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // end before start
    let resp = app
        .oneshot(
            Request::get("/export?source=42&start=29-08-2026&end=01-08-2026")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn rows_format_returns_flat_rows() {
    let app = app();
    app.clone()
        .oneshot(ingest_req("42", POSTING, None))
        .await
        .unwrap();

    let resp = app
        .oneshot(
            Request::get("/report?source=42&range=day&format=rows")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let s = body_string(resp).await;
    assert!(s.contains("\"data_type\":\"price\""));
    assert!(s.contains("\"data_type\":\"address\""));
    assert!(s.contains("\"value\":\"Main St 1\""));
}

#[tokio::test]
async fn csv_export_round_trip() {
    let app = app();
    app.clone()
        .oneshot(ingest_req("42", POSTING, Some("2026.08.29 12:00:00")))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::get("/export?source=42&start=29-08-2026&end=29-08-2026")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let s = body_string(resp).await;
    assert!(s.starts_with("City|Data Type|Value|Count\n"));
    assert!(s.contains("Moscow|price|600|1\n"));
    assert!(s.contains("Moscow|address|Main St 1|9\n"));

    // unknown source over any window is the distinct no-content outcome
    let resp = app
        .oneshot(
            Request::get("/export?source=nobody&start=01-08-2026&end=02-08-2026")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
