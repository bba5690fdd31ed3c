//! Staging store.
//!
//! Holds validated sections of unfinished submissions, keyed by
//! `(session, section)`. Writes are last-writer-wins upserts and every entry
//! expires on its own after the staging TTL.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use time::OffsetDateTime;
use tracing::warn;

use crate::entity::staging_entry::{self, ActiveModel as StagingActiveModel, Entity as StagingEntity};
use crate::error::StoreError;
use crate::section::{SectionKind, SectionRecord};
use crate::session::SessionId;
use crate::session_store::convert_time_to_datetime;

/// Contract the coordinator relies on for per-section staging.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Upserts the record for `(session_id, kind)`.
    async fn put(
        &self,
        session_id: &SessionId,
        kind: SectionKind,
        record: &SectionRecord,
    ) -> Result<(), StoreError>;

    /// Returns the live record for `(session_id, kind)`, if any.
    async fn get(
        &self,
        session_id: &SessionId,
        kind: SectionKind,
    ) -> Result<Option<SectionRecord>, StoreError>;

    /// Every live record of a session; missing kinds are absent from the map.
    async fn get_all(
        &self,
        session_id: &SessionId,
    ) -> Result<BTreeMap<SectionKind, SectionRecord>, StoreError>;

    /// Drops every entry of a session, live or expired.
    async fn delete_all(&self, session_id: &SessionId) -> Result<(), StoreError>;

    /// Removes entries whose TTL has elapsed.
    async fn delete_expired(&self) -> Result<u64, StoreError>;
}

/// [`StagingStore`] backed by the `staging_entry` table.
#[derive(Debug, Clone)]
pub struct SeaOrmStagingStore {
    conn: DatabaseConnection,
    ttl: Duration,
}

impl SeaOrmStagingStore {
    /// `ttl` is how long an entry lives after its last write.
    pub fn new(conn: DatabaseConnection, ttl: Duration) -> Self {
        Self { conn, ttl }
    }

    fn decode(model: &staging_entry::Model) -> Result<SectionRecord, StoreError> {
        let kind: SectionKind = model
            .section
            .parse()
            .map_err(|e: crate::section::UnknownSection| StoreError::Decode(e.to_string()))?;
        let record: SectionRecord =
            rmp_serde::from_slice(&model.data).map_err(|e| StoreError::Decode(e.to_string()))?;

        if record.kind() != kind {
            return Err(StoreError::Decode(format!(
                "entry for {} holds a {} record",
                kind,
                record.kind()
            )));
        }
        Ok(record)
    }
}

#[async_trait]
impl StagingStore for SeaOrmStagingStore {
    async fn put(
        &self,
        session_id: &SessionId,
        kind: SectionKind,
        record: &SectionRecord,
    ) -> Result<(), StoreError> {
        if record.kind() != kind {
            return Err(StoreError::Encode(format!(
                "cannot stage a {} record as {}",
                record.kind(),
                kind
            )));
        }

        let data = rmp_serde::to_vec_named(record).map_err(|e| StoreError::Encode(e.to_string()))?;
        let now = OffsetDateTime::now_utc();
        let updated_at = convert_time_to_datetime(now);
        let expiry_date = convert_time_to_datetime(now + self.ttl);

        let entry = StagingActiveModel {
            session_id: Set(session_id.to_string()),
            section: Set(kind.as_str().to_string()),
            data: Set(data),
            updated_at: Set(updated_at),
            expiry_date: Set(expiry_date),
        };

        // Single statement so overlapping saves of one section cannot collide
        StagingEntity::insert(entry)
            .on_conflict(
                OnConflict::columns([
                    staging_entry::Column::SessionId,
                    staging_entry::Column::Section,
                ])
                .update_columns([
                    staging_entry::Column::Data,
                    staging_entry::Column::UpdatedAt,
                    staging_entry::Column::ExpiryDate,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    async fn get(
        &self,
        session_id: &SessionId,
        kind: SectionKind,
    ) -> Result<Option<SectionRecord>, StoreError> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc());

        let entry = StagingEntity::find_by_id((session_id.to_string(), kind.as_str().to_string()))
            .filter(staging_entry::Column::ExpiryDate.gt(now_db))
            .one(&self.conn)
            .await?;

        entry.as_ref().map(Self::decode).transpose()
    }

    async fn get_all(
        &self,
        session_id: &SessionId,
    ) -> Result<BTreeMap<SectionKind, SectionRecord>, StoreError> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc());

        let entries = StagingEntity::find()
            .filter(staging_entry::Column::SessionId.eq(session_id.to_string()))
            .filter(staging_entry::Column::ExpiryDate.gt(now_db))
            .all(&self.conn)
            .await?;

        let mut records = BTreeMap::new();
        for entry in &entries {
            match Self::decode(entry) {
                Ok(record) => {
                    records.insert(record.kind(), record);
                }
                // An unreadable entry counts as missing; the user re-enters that section
                Err(err) => {
                    warn!(session_id = %session_id, section = %entry.section, error = %err, "skipping unreadable staging entry");
                }
            }
        }
        Ok(records)
    }

    async fn delete_all(&self, session_id: &SessionId) -> Result<(), StoreError> {
        StagingEntity::delete_many()
            .filter(staging_entry::Column::SessionId.eq(session_id.to_string()))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc());

        let result = StagingEntity::delete_many()
            .filter(staging_entry::Column::ExpiryDate.lt(now_db))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
