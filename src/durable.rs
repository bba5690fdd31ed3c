//! Durable store for committed submissions.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use crate::entity::submission::{
    self, ActiveModel as SubmissionActiveModel, Entity as SubmissionEntity,
};
use crate::error::StoreError;
use crate::section::SubmissionRecord;

/// Write contract of the store that keeps committed submissions.
///
/// `commit` must be atomic: the whole record is visible afterwards or none
/// of it is. It must also honour the idempotency key, returning the record
/// already stored under that key instead of writing a second one.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Writes `record` unless a submission for `idempotency_key` already
    /// exists.
    ///
    /// # Returns
    ///
    /// * `Ok(record)` - The stored record. On replay this is the record from
    ///   the first commit, not the one passed in.
    /// * `Err(StoreError::DuplicateEmail)` - Another session already submitted
    ///   this email.
    /// * `Err(_)` - Nothing was written.
    async fn commit(
        &self,
        idempotency_key: &str,
        record: &SubmissionRecord,
    ) -> Result<SubmissionRecord, StoreError>;

    /// The record committed under `idempotency_key`, if any.
    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<SubmissionRecord>, StoreError>;

    /// The record with durable identifier `id`, if any.
    async fn get(&self, id: &str) -> Result<Option<SubmissionRecord>, StoreError>;

    /// Submissions in commit order.
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<SubmissionRecord>, StoreError>;
}

/// [`DurableStore`] backed by the `submission` table.
#[derive(Debug, Clone)]
pub struct SeaOrmDurableStore {
    conn: DatabaseConnection,
}

impl SeaOrmDurableStore {
    /// Creates a durable store over an existing connection.
    ///
    /// The `submission` table must exist; run the crate's `Migrator` first.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DurableStore for SeaOrmDurableStore {
    async fn commit(
        &self,
        idempotency_key: &str,
        record: &SubmissionRecord,
    ) -> Result<SubmissionRecord, StoreError> {
        let txn = self.conn.begin().await?;

        if let Some(existing) = SubmissionEntity::find()
            .filter(submission::Column::IdempotencyKey.eq(idempotency_key))
            .one(&txn)
            .await?
        {
            txn.commit().await?;
            debug!(submission_id = %existing.id, "idempotent replay of committed submission");
            return Ok(existing.into());
        }

        if SubmissionEntity::find()
            .filter(submission::Column::Email.eq(record.email.as_str()))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(StoreError::DuplicateEmail(record.email.clone()));
        }

        let model = SubmissionActiveModel {
            id: Set(record.id.clone()),
            idempotency_key: Set(idempotency_key.to_string()),
            name: Set(record.name.clone()),
            phone_number: Set(record.phone_number.clone()),
            email: Set(record.email.clone()),
            date_of_birth: Set(record.date_of_birth),
            tenth_percentage: Set(record.tenth_percentage),
            twelfth_percentage: Set(record.twelfth_percentage),
            graduation_marks: Set(record.graduation_marks),
            company_name: Set(record.company_name.clone()),
            domain: Set(record.domain.clone()),
            years_of_experience: Set(record.years_of_experience),
            last_salary: Set(record.last_salary),
            created_at: Set(record.created_at.into()),
        };

        match model.insert(&txn).await {
            Ok(inserted) => {
                txn.commit().await?;
                Ok(inserted.into())
            }
            // A concurrent commit won the race on one of the unique columns
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                drop(txn);
                match self.find_by_idempotency_key(idempotency_key).await? {
                    Some(existing) => Ok(existing),
                    None => Err(StoreError::DuplicateEmail(record.email.clone())),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        let model = SubmissionEntity::find()
            .filter(submission::Column::IdempotencyKey.eq(idempotency_key))
            .one(&self.conn)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn get(&self, id: &str) -> Result<Option<SubmissionRecord>, StoreError> {
        let model = SubmissionEntity::find_by_id(id.to_string())
            .one(&self.conn)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<SubmissionRecord>, StoreError> {
        let models = SubmissionEntity::find()
            .order_by_asc(submission::Column::CreatedAt)
            .order_by_asc(submission::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

impl From<submission::Model> for SubmissionRecord {
    fn from(model: submission::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone_number: model.phone_number,
            email: model.email,
            date_of_birth: model.date_of_birth,
            tenth_percentage: model.tenth_percentage,
            twelfth_percentage: model.twelfth_percentage,
            graduation_marks: model.graduation_marks,
            company_name: model.company_name,
            domain: model.domain,
            years_of_experience: model.years_of_experience,
            last_salary: model.last_salary,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
