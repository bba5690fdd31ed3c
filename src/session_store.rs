use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use time::OffsetDateTime;
use tower_sessions::{session::Id, session::Record, session_store, ExpiredDeletion, SessionStore};

use crate::entity::session::{
    self, ActiveModel as SessionActiveModel, Entity as SessionEntity, SessionState,
};

/// A Sea-ORM backed registry of submission sessions.
///
/// `SeaOrmSessionStore` implements [`SessionStore`] and [`ExpiredDeletion`] from
/// `tower-sessions`, so session ids, records and expiry follow the same rules as
/// any other tower-sessions backend. On top of that it tracks a
/// [`SessionState`] per row and offers [`transition`](Self::transition), a
/// compare-and-set used to serialize final submissions.
///
/// Session records are serialized with MessagePack.
///
/// # Error Handling
///
/// Trait methods map Sea-ORM errors to `tower_sessions::session_store::Error`:
///
/// - Database errors → `session_store::Error::Backend`
/// - Serialization errors → `session_store::Error::Encode`
/// - Deserialization errors → `session_store::Error::Decode`
///
/// Inherent methods return [`DbErr`] unchanged.
#[derive(Debug, Clone)]
pub struct SeaOrmSessionStore {
    conn: DatabaseConnection,
}

impl SeaOrmSessionStore {
    /// Creates a session store over an existing connection.
    ///
    /// The `intake_session` table must exist; run the crate's `Migrator` first.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns the lifecycle state of a live session, or `None` when the
    /// session is unknown or past its expiry date.
    pub async fn state(&self, session_id: &Id) -> Result<Option<SessionState>, DbErr> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc());

        let model = SessionEntity::find_by_id(session_id.to_string())
            .filter(session::Column::ExpiryDate.gt(now_db))
            .one(&self.conn)
            .await?;

        Ok(model.map(|m| m.state))
    }

    /// Atomically moves a live session from `from` to `to`.
    ///
    /// Returns `true` when this call performed the transition and `false`
    /// when the session was not in `from` (or had expired) at the time of
    /// the update.
    pub async fn transition(
        &self,
        session_id: &Id,
        from: SessionState,
        to: SessionState,
    ) -> Result<bool, DbErr> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc());

        let result = SessionEntity::update_many()
            .col_expr(session::Column::State, Expr::value(to))
            .filter(session::Column::Id.eq(session_id.to_string()))
            .filter(session::Column::State.eq(from))
            .filter(session::Column::ExpiryDate.gt(now_db))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected == 1)
    }
}

#[async_trait]
impl SessionStore for SeaOrmSessionStore {
    /// Inserts a new session in the `Active` state.
    ///
    /// If the record's id is already taken a fresh one is generated, so the id
    /// on `record` may change.
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        // Session ID collision mitigation
        while SessionEntity::find_by_id(record.id.to_string())
            .one(&txn)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?
            .is_some()
        {
            record.id = Id::default();
        }

        let data =
            rmp_serde::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;

        let now = convert_time_to_datetime(OffsetDateTime::now_utc());

        let session_model = SessionActiveModel {
            id: Set(record.id.to_string()),
            data: Set(data),
            expiry_date: Set(convert_time_to_datetime(record.expiry_date)),
            state: Set(SessionState::Active),
            created_at: Set(now),
        };

        session_model
            .insert(&txn)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        Ok(())
    }

    /// Upserts a session record. The lifecycle state of an existing row is
    /// left untouched; new rows start `Active`.
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data =
            rmp_serde::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;

        let expiry_date = convert_time_to_datetime(record.expiry_date);

        match SessionEntity::find_by_id(record.id.to_string())
            .one(&self.conn)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?
        {
            Some(existing) => {
                let mut active_model = existing.into_active_model();
                active_model.data = Set(data);
                active_model.expiry_date = Set(expiry_date);
                active_model
                    .update(&self.conn)
                    .await
                    .map_err(|e| session_store::Error::Backend(e.to_string()))?;
            }
            None => {
                let session_model = SessionActiveModel {
                    id: Set(record.id.to_string()),
                    data: Set(data),
                    expiry_date: Set(expiry_date),
                    state: Set(SessionState::Active),
                    created_at: Set(convert_time_to_datetime(OffsetDateTime::now_utc())),
                };

                session_model
                    .insert(&self.conn)
                    .await
                    .map_err(|e| session_store::Error::Backend(e.to_string()))?;
            }
        }

        Ok(())
    }

    /// Loads a session record that has not yet expired, whatever its state.
    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc());

        let session = SessionEntity::find_by_id(session_id.to_string())
            .filter(session::Column::ExpiryDate.gt(now_db))
            .one(&self.conn)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        match session {
            Some(model) => {
                let record = rmp_serde::from_slice(&model.data)
                    .map_err(|e| session_store::Error::Decode(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        SessionEntity::delete_by_id(session_id.to_string())
            .exec(&self.conn)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for SeaOrmSessionStore {
    /// Deletes every session row whose expiry date has passed.
    ///
    /// Called periodically by the cleanup task in [`crate::cleanup`].
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc());

        SessionEntity::delete_many()
            .filter(session::Column::ExpiryDate.lt(now_db))
            .exec(&self.conn)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        Ok(())
    }
}

/// Converts a `time::OffsetDateTime` into Sea-ORM's chrono-based
/// `DateTimeWithTimeZone`, always in UTC so stored values compare correctly.
pub(crate) fn convert_time_to_datetime(time: OffsetDateTime) -> DateTimeWithTimeZone {
    use chrono::{DateTime, Utc};

    DateTime::<Utc>::from_timestamp(time.unix_timestamp(), time.nanosecond())
        .unwrap_or_default()
        .into()
}
