//! Integration tests for the HTTP API.
//!
//! Tests cover:
//! - Session creation and the x-session-id header contract
//! - Section save/load including adopt-on-response session minting
//! - Error mapping for validation, incomplete and repeated submissions
//! - Read access to committed submissions

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::*;
use serde_json::{json, Value};
use staged_intake::api::{build_router, AppState, SESSION_HEADER};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: router over a fresh in-memory database.
async fn setup_app() -> Router {
    let h = harness().await;
    build_router(AppState::new(Arc::new(h.coordinator)))
}

/// Test helper: build a request with optional session header and JSON body.
fn request(method: &str, uri: &str, session: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header(SESSION_HEADER, session);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: send a request and return status plus parsed JSON body.
async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, request("POST", "/api/create-session", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"]
        .as_str()
        .expect("session_id should be a string")
        .to_string()
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;
    let (status, body) = send(&app, request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_index_reports_version() {
    let app = setup_app().await;
    let (status, body) = send(&app, request("GET", "/", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["version"].is_string());
}

// =============================================================================
// Sections
// =============================================================================

#[tokio::test]
async fn test_save_and_load_personal() {
    let app = setup_app().await;
    let session = create_session(&app).await;

    let input = personal_json("a@b.com");
    let (status, body) = send(
        &app,
        request("POST", "/api/personal", Some(&session), Some(input.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["session_id"], session.as_str());

    let (status, body) = send(&app, request("GET", "/api/personal", Some(&session), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], input);
}

#[tokio::test]
async fn test_load_unsaved_section_returns_null() {
    let app = setup_app().await;
    let session = create_session(&app).await;

    let (status, body) = send(&app, request("GET", "/api/experience", Some(&session), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["session_id"], session.as_str());
}

#[tokio::test]
async fn test_save_without_session_mints_one() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        request("POST", "/api/education", None, Some(education_json())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let minted = body["session_id"].as_str().unwrap().to_string();

    let (_, body) = send(&app, request("GET", "/api/education", Some(&minted), None)).await;
    assert_eq!(body["data"]["twelfth_percentage"], json!(88.0));
}

#[tokio::test]
async fn test_garbage_session_header_is_replaced() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/education",
            Some("not-a-session"),
            Some(education_json()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["session_id"], "not-a-session");
}

#[tokio::test]
async fn test_validation_error_names_field() {
    let app = setup_app().await;
    let session = create_session(&app).await;

    let mut input = education_json();
    input["tenth_percentage"] = json!(150);

    let (status, body) = send(
        &app,
        request("POST", "/api/education", Some(&session), Some(input)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "tenth_percentage");
    assert!(body["message"].as_str().unwrap().contains("tenth_percentage"));
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let app = setup_app().await;
    let session = create_session(&app).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/personal")
        .header(SESSION_HEADER, &session)
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());

    let (status, body) = send(
        &app,
        request("POST", "/api/education", Some(&session), Some(json!([1, 2, 3]))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

// =============================================================================
// Final submission
// =============================================================================

#[tokio::test]
async fn test_incomplete_submission() {
    let app = setup_app().await;
    let session = create_session(&app).await;

    send(
        &app,
        request("POST", "/api/personal", Some(&session), Some(personal_json("a@b.com"))),
    )
    .await;
    send(
        &app,
        request("POST", "/api/education", Some(&session), Some(education_json())),
    )
    .await;

    let (status, body) = send(&app, request("POST", "/api/submit-final", Some(&session), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "incomplete_submission");
    assert!(body["message"].as_str().unwrap().contains("experience"));
}

#[tokio::test]
async fn test_full_submission_flow() {
    let app = setup_app().await;
    let session = create_session(&app).await;

    for (section, input) in [
        ("personal", personal_json("a@b.com")),
        ("education", education_json()),
        ("experience", experience_json()),
    ] {
        let (status, _) = send(
            &app,
            request("POST", &format!("/api/{section}"), Some(&session), Some(input)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, request("POST", "/api/submit-final", Some(&session), None)).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().unwrap().to_string();
    assert_ne!(id, session);

    let (status, body) = send(&app, request("POST", "/api/submit-final", Some(&session), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_submitted");

    let (status, body) = send(&app, request("GET", &format!("/api/submissions/{id}"), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["company_name"], "Acme Logistics");

    let (status, body) = send(&app, request("GET", "/api/submissions", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_submit_without_session_header() {
    let app = setup_app().await;

    let (status, body) = send(&app, request("POST", "/api/submit-final", None, None)).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "session_expired");
}

#[tokio::test]
async fn test_abandon_session() {
    let app = setup_app().await;
    let session = create_session(&app).await;

    let (status, _) = send(&app, request("DELETE", "/api/session", Some(&session), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, request("POST", "/api/submit-final", Some(&session), None)).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "session_expired");
}

// =============================================================================
// Submissions
// =============================================================================

#[tokio::test]
async fn test_unknown_submission_is_not_found() {
    let app = setup_app().await;

    let (status, body) = send(&app, request("GET", "/api/submissions/nope", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_submission_page_size_is_bounded() {
    let app = setup_app().await;

    let (status, _) = send(&app, request("GET", "/api/submissions?limit=0", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, request("GET", "/api/submissions?limit=1001", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, request("GET", "/api/submissions?skip=0&limit=5", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}
