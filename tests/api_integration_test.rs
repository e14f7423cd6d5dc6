//! Integration tests for the REST linkage API. Requires a reachable
//! Postgres instance per `DATABASE_URL` (see `tests/common`).

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = common::create_test_router();

    let response = app
        .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assertables::assert_contains!(body_str, "healthy");
}

/// Drives the same request outside the `#[tokio::test]` macro, as a plain
/// `#[test]` blocking on the future directly.
#[test]
fn test_health_check_blocking() {
    let app = common::create_test_router();

    let status = tokio_test::block_on(async {
        app.oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    });

    assert_eq!(status, StatusCode::OK);
}

async fn link(app: axum::Router, payload: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/link")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn record(family: &str, birth_date: &str) -> Value {
    json!({
        "record": {
            "birth_date": birth_date,
            "sex": "female",
            "name": [{"family": family, "given": ["Integration"]}],
            "address": [{"line": ["123 Main St"], "city": "Springfield", "state": "IL", "postal_code": "62704"}],
            "telecom": [{"system": "phone", "value": "217-555-0100"}],
            "identifiers": [{"type": "MR", "authority": "FACILITY-A", "value": "00012345"}]
        }
    })
}

#[tokio::test]
async fn test_link_new_record_creates_person() {
    let app = common::create_test_router();
    let family = common::unique_family_name("New");

    let (status, body) = link(app, record(&family, "1990-05-15")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["match_grade"], "certainly-not");
    assert!(body["data"]["person_reference_id"].is_string());
}

#[tokio::test]
async fn test_link_repeated_record_attaches_same_person() {
    let app = common::create_test_router();
    let family = common::unique_family_name("Repeat");

    let (first_status, first_body) = link(app.clone(), record(&family, "1985-03-20")).await;
    assert_eq!(first_status, StatusCode::OK);
    let first_person = first_body["data"]["person_reference_id"].clone();

    let (second_status, second_body) = link(app, record(&family, "1985-03-20")).await;
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second_body["data"]["match_grade"], "certain");
    assert_eq!(second_body["data"]["person_reference_id"], first_person);
}

#[tokio::test]
async fn test_link_rejects_empty_record() {
    let app = common::create_test_router();

    let (status, body) = link(app, json!({"record": {}})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assertables::assert_contains!(body["detail"].as_str().unwrap(), "empty");
}

#[tokio::test]
async fn test_link_rejects_unknown_algorithm() {
    let app = common::create_test_router();
    let family = common::unique_family_name("BadAlgo");

    let mut payload = record(&family, "1990-01-01");
    payload["algorithm"] = json!("does-not-exist");

    let (status, body) = link(app, payload).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "No algorithm found");
}

#[tokio::test]
async fn test_get_default_algorithm() {
    let app = common::create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/algorithms/dibbs-default")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["label"], "dibbs-default");
}
