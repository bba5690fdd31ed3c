//! Shared fixtures for integration tests: an in-memory SQLite database with
//! the schema applied, and a coordinator wired to it.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use staged_intake::migration::Migrator;
use staged_intake::retry::RetryPolicy;
use staged_intake::{
    DurableStore, RawFields, SeaOrmDurableStore, SeaOrmSessionStore, SeaOrmStagingStore,
    SessionManager, SubmissionCoordinator,
};

pub const TTL: Duration = Duration::from_secs(3600);

/// Test helper: fresh in-memory database with migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Should connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Should apply migrations");
    db
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        attempt_timeout: Duration::from_secs(5),
    }
}

pub struct Harness {
    pub db: DatabaseConnection,
    pub coordinator: SubmissionCoordinator,
    pub sessions: SessionManager,
    pub staging: Arc<SeaOrmStagingStore>,
    pub durable: Arc<SeaOrmDurableStore>,
}

/// Test helper: coordinator over SeaORM stores with the given TTLs.
pub async fn harness_with_ttl(session_ttl: Duration, staging_ttl: Duration) -> Harness {
    let db = setup_db().await;
    let durable = Arc::new(SeaOrmDurableStore::new(db.clone()));
    harness_with_durable(db, session_ttl, staging_ttl, durable.clone(), durable).await
}

pub async fn harness() -> Harness {
    harness_with_ttl(TTL, TTL).await
}

/// Test helper: like [`harness`] but the coordinator commits through
/// `commit_via`, which usually wraps `durable`.
pub async fn harness_with_durable(
    db: DatabaseConnection,
    session_ttl: Duration,
    staging_ttl: Duration,
    durable: Arc<SeaOrmDurableStore>,
    commit_via: Arc<dyn DurableStore>,
) -> Harness {
    let sessions = SessionManager::new(SeaOrmSessionStore::new(db.clone()), session_ttl);
    let staging = Arc::new(SeaOrmStagingStore::new(db.clone(), staging_ttl));

    let coordinator = SubmissionCoordinator::new(sessions.clone(), staging.clone(), commit_via)
        .with_store_retry(fast_retry(3))
        .with_commit_retry(fast_retry(3));

    Harness {
        db,
        coordinator,
        sessions,
        staging,
        durable,
    }
}

pub fn fields(value: Value) -> RawFields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub fn personal_json(email: &str) -> Value {
    json!({
        "name": "Asha",
        "phone_number": "9876543210",
        "email": email,
        "date_of_birth": "1995-01-01"
    })
}

pub fn education_json() -> Value {
    json!({
        "tenth_percentage": 91.5,
        "twelfth_percentage": 88,
        "graduation_marks": "76.25"
    })
}

pub fn experience_json() -> Value {
    json!({
        "company_name": "Acme Logistics",
        "domain": "Supply chain",
        "years_of_experience": 4.5,
        "last_salary": 850000
    })
}
