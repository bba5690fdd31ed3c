//! Error types for the submission workflow.
//!
//! Three layers of failure show up here: field-level [`ValidationError`]s
//! produced by the section validators, [`StoreError`]s raised by the
//! session, staging and durable stores, and [`SubmissionError`], the
//! taxonomy the coordinator reports to its callers.

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::section::SectionKind;

/// A single rule violation on one field of a section.
///
/// Validators stop at the first failing rule, so there is never more than
/// one of these per call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending field, as it appears in the request body.
    pub field: &'static str,
    /// Human-readable constraint that was violated.
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures raised by the backing stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A store call did not complete within its deadline.
    #[error("store operation timed out")]
    Timeout,

    /// A record could not be serialized for storage.
    #[error("failed to encode record: {0}")]
    Encode(String),

    /// A stored record could not be read back.
    #[error("failed to decode record: {0}")]
    Decode(String),

    /// The durable store already holds a submission with this email.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout)
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(e) => StoreError::Unavailable(e.to_string()),
            DbErr::Conn(e) => StoreError::Unavailable(e.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<tower_sessions::session_store::Error> for StoreError {
    fn from(err: tower_sessions::session_store::Error) -> Self {
        use tower_sessions::session_store::Error;

        match err {
            Error::Encode(msg) => StoreError::Encode(msg),
            Error::Decode(msg) => StoreError::Decode(msg),
            Error::Backend(msg) => StoreError::Unavailable(msg),
        }
    }
}

/// Errors reported by the [`SubmissionCoordinator`](crate::SubmissionCoordinator).
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The session is unknown, expired or no longer accepts writes.
    #[error("session expired; start a new session")]
    SessionExpired,

    /// A section failed its business rules.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Final submission was attempted before every section was staged.
    #[error("incomplete submission; missing section(s): {}", join_kinds(.missing))]
    IncompleteSubmission { missing: Vec<SectionKind> },

    /// The session has already produced its submission record.
    #[error("this session has already been submitted")]
    AlreadySubmitted,

    /// Another final submission for the same session is being committed.
    #[error("a submission for this session is already in progress")]
    SubmissionInProgress,

    /// The email on the personal section is already on record.
    #[error("a submission with email {0} already exists")]
    DuplicateEmail(String),

    /// The durable write did not succeed after all retries.
    #[error("failed to commit submission: {0}")]
    CommitFailed(String),

    /// A session or staging store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_kinds(kinds: &[SectionKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, SubmissionError>;
