//! HTTP surface of the workflow.
//!
//! The session travels in the `x-session-id` request header. Section writes
//! and reads never reject a missing or stale session: a new one is minted
//! and returned in the body, and the client adopts it.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::coordinator::SubmissionCoordinator;
use crate::error::SubmissionError;
use crate::section::{SectionKind, SubmissionRecord};
use crate::session::SessionId;

/// Request header carrying the session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

const MAX_PAGE_SIZE: u64 = 1000;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SubmissionCoordinator>,
}

impl AppState {
    pub fn new(coordinator: Arc<SubmissionCoordinator>) -> Self {
        Self { coordinator }
    }
}

/// Routes of the intake API with request tracing applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/create-session", post(create_session))
        .route("/api/submit-final", post(submit_final))
        .route("/api/session", delete(abandon_session))
        .route("/api/submissions", get(list_submissions))
        .route("/api/submissions/{id}", get(get_submission))
        .route("/api/{section}", get(load_section).post(save_section))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Every failure the HTTP layer can report.
#[derive(Debug)]
pub enum ApiError {
    Submission(SubmissionError),
    NotFound(String),
    BadRequest(String),
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        ApiError::Submission(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message, None),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "bad_request", message, None)
            }
            ApiError::Submission(err) => {
                let (status, code) = match &err {
                    SubmissionError::SessionExpired => (StatusCode::GONE, "session_expired"),
                    SubmissionError::Validation(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
                    }
                    SubmissionError::IncompleteSubmission { .. } => {
                        (StatusCode::BAD_REQUEST, "incomplete_submission")
                    }
                    SubmissionError::AlreadySubmitted => (StatusCode::CONFLICT, "already_submitted"),
                    SubmissionError::SubmissionInProgress => {
                        (StatusCode::CONFLICT, "submission_in_progress")
                    }
                    SubmissionError::DuplicateEmail(_) => (StatusCode::CONFLICT, "duplicate_email"),
                    SubmissionError::CommitFailed(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "commit_failed")
                    }
                    SubmissionError::Store(e) if e.is_transient() => {
                        (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
                    }
                    SubmissionError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
                };

                let field = match &err {
                    SubmissionError::Validation(v) => Some(v.field),
                    _ => None,
                };

                let message = match &err {
                    SubmissionError::CommitFailed(_) => {
                        error!(error = %err, "final submission failed");
                        "Your data is saved but could not be submitted right now. Please try again."
                            .to_string()
                    }
                    SubmissionError::Store(e) if e.is_transient() => {
                        error!(error = %err, "store unavailable");
                        "The service is temporarily unavailable. Please try again.".to_string()
                    }
                    SubmissionError::Store(_) => {
                        error!(error = %err, "store failure");
                        "The request could not be processed.".to_string()
                    }
                    _ => err.to_string(),
                };

                (status, code, message, field)
            }
        };

        let mut body = json!({
            "success": false,
            "error": code,
            "message": message,
        });
        if let Some(field) = field {
            body["field"] = Value::from(field);
        }

        (status, Json(body)).into_response()
    }
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Staged intake API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn create_session(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let session_id = state.coordinator.create_session().await?;
    Ok(Json(json!({
        "session_id": session_id.to_string(),
        "message": "Session created successfully",
    })))
}

async fn save_section(
    State(state): State<AppState>,
    Path(kind): Path<SectionKind>,
    headers: HeaderMap,
    payload: Result<Json<serde_json::Map<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(fields) = payload.map_err(|rejection| {
        ApiError::BadRequest(format!(
            "{} body must be a JSON object: {}",
            kind,
            rejection.body_text()
        ))
    })?;
    let session_id = state
        .coordinator
        .save_section_adopting(session_from_headers(&headers), kind, &fields)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} information saved", kind),
        "session_id": session_id.to_string(),
    })))
}

async fn load_section(
    State(state): State<AppState>,
    Path(kind): Path<SectionKind>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let (session_id, record) = state
        .coordinator
        .load_section_adopting(session_from_headers(&headers), kind)
        .await?;

    let data = record
        .map(|r| Value::Object(r.to_raw_fields()))
        .unwrap_or(Value::Null);

    Ok(Json(json!({
        "success": true,
        "data": data,
        "session_id": session_id.to_string(),
    })))
}

async fn submit_final(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session_id = session_from_headers(&headers).ok_or(SubmissionError::SessionExpired)?;
    let id = state.coordinator.submit_final(&session_id).await?;
    Ok(Json(json!({ "id": id })))
}

async fn abandon_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session_id = session_from_headers(&headers).ok_or(SubmissionError::SessionExpired)?;
    state.coordinator.abandon(&session_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Session discarded",
    })))
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    skip: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

fn default_limit() -> u64 {
    100
}

async fn list_submissions(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<SubmissionRecord>>, ApiError> {
    if page.limit == 0 || page.limit > MAX_PAGE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let records = state
        .coordinator
        .list_submissions(page.skip, page.limit)
        .await?;
    Ok(Json(records))
}

async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubmissionRecord>, ApiError> {
    state
        .coordinator
        .get_submission(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("submission {} not found", id)))
}
