//! Session manager.
//!
//! Issues submission-session identifiers and answers whether they are still
//! usable. A session stays usable for a fixed inactivity window that is
//! refreshed by every staging read or write, and stops being usable once its
//! submission has been committed.

use std::collections::HashMap;
use std::time::Duration;

use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::{ExpiredDeletion, SessionStore};
use tracing::debug;

use crate::entity::session::SessionState;
use crate::error::StoreError;
use crate::session_store::SeaOrmSessionStore;

/// Identifier of one submission session (not of a person).
pub type SessionId = Id;

/// What the session manager knows about a session identifier right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Accepts staging reads and writes.
    Active,
    /// Claimed by a final submission that has not finished yet.
    Committing,
    /// Consumed by its committed submission.
    Submitted,
    /// Unknown, or its inactivity window has elapsed.
    Expired,
}

impl From<Option<SessionState>> for SessionStatus {
    fn from(state: Option<SessionState>) -> Self {
        match state {
            Some(SessionState::Active) => SessionStatus::Active,
            Some(SessionState::Committing) => SessionStatus::Committing,
            Some(SessionState::Submitted) => SessionStatus::Submitted,
            None => SessionStatus::Expired,
        }
    }
}

/// Issues sessions and tracks their lifecycle on top of a
/// [`SeaOrmSessionStore`].
///
/// Every session gets the same inactivity window (`ttl`), refreshed by
/// [`touch`](Self::touch).
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: SeaOrmSessionStore,
    ttl: Duration,
}

impl SessionManager {
    /// Creates a session manager.
    ///
    /// # Parameters
    ///
    /// * `store` - Registry the sessions are kept in.
    /// * `ttl` - Inactivity window after which a session expires.
    pub fn new(store: SeaOrmSessionStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Inactivity window of every session issued here.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a fresh session.
    pub async fn create_session(&self) -> Result<SessionId, StoreError> {
        let now = OffsetDateTime::now_utc();
        let mut data = HashMap::new();
        data.insert(
            "created_at".to_string(),
            serde_json::Value::from(now.unix_timestamp()),
        );

        let mut record = Record {
            id: Id::default(),
            data,
            expiry_date: now + self.ttl,
        };
        self.store.create(&mut record).await?;

        debug!(session_id = %record.id, "session created");
        Ok(record.id)
    }

    /// Current lifecycle status; unknown ids report [`SessionStatus::Expired`].
    pub async fn status(&self, session_id: &SessionId) -> Result<SessionStatus, StoreError> {
        Ok(self.store.state(session_id).await?.into())
    }

    /// `true` only for live sessions that still accept staging writes.
    pub async fn is_valid(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        Ok(self.status(session_id).await? == SessionStatus::Active)
    }

    /// Pushes the inactivity deadline of an active session forward by the TTL.
    /// Unknown or expired sessions are left alone.
    pub async fn touch(&self, session_id: &SessionId) -> Result<(), StoreError> {
        if let Some(mut record) = self.store.load(session_id).await? {
            record.expiry_date = OffsetDateTime::now_utc() + self.ttl;
            self.store.save(&record).await?;
        }
        Ok(())
    }

    /// Claims an active session for final submission.
    ///
    /// At most one concurrent caller receives `true`.
    pub async fn begin_commit(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        Ok(self
            .store
            .transition(session_id, SessionState::Active, SessionState::Committing)
            .await?)
    }

    /// Returns a claimed session to `Active` after a failed commit.
    pub async fn abort_commit(&self, session_id: &SessionId) -> Result<(), StoreError> {
        self.store
            .transition(session_id, SessionState::Committing, SessionState::Active)
            .await?;
        Ok(())
    }

    /// Marks a claimed session as consumed by its submission.
    pub async fn finish_commit(&self, session_id: &SessionId) -> Result<(), StoreError> {
        self.store
            .transition(session_id, SessionState::Committing, SessionState::Submitted)
            .await?;
        Ok(())
    }

    /// Forgets a session entirely.
    pub async fn end(&self, session_id: &SessionId) -> Result<(), StoreError> {
        self.store.delete(session_id).await?;
        Ok(())
    }

    /// Removes session rows whose inactivity window has elapsed.
    pub async fn delete_expired(&self) -> Result<(), StoreError> {
        self.store.delete_expired().await?;
        Ok(())
    }
}
