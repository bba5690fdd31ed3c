//! Staging entity model.
//!
//! One row per `(session_id, section)`; writing the same key replaces the
//! row. `data` carries the MessagePack-encoded `SectionRecord`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "staging_entry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub session_id: String,

    /// Lowercase section name: `personal`, `education` or `experience`.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub section: String,

    pub data: Vec<u8>,

    pub updated_at: DateTimeWithTimeZone,

    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
