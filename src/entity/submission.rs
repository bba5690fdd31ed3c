//! Submission entity model.
//!
//! Committed submissions are written once and never updated. The
//! `idempotency_key` (the originating session id) is unique so a retried
//! commit can never produce a second row.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    #[sea_orm(unique, column_type = "Text")]
    pub idempotency_key: String,

    pub name: String,
    pub phone_number: String,
    #[sea_orm(unique)]
    pub email: String,
    pub date_of_birth: Date,

    pub tenth_percentage: f64,
    pub twelfth_percentage: f64,
    pub graduation_marks: f64,

    pub company_name: String,
    pub domain: String,
    pub years_of_experience: f64,
    pub last_salary: f64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
