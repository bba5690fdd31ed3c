//! Session entity model for Sea-ORM database interaction.
//!
//! Maps to the `intake_session` table. Each row holds a MessagePack-encoded
//! `tower_sessions` record next to the lifecycle state used to guard the
//! final commit.

use sea_orm::entity::prelude::*;

/// Lifecycle of a submission session.
///
/// `Active` sessions accept staging reads and writes. A final submission
/// moves the session to `Committing` with a compare-and-set and, once the
/// durable write succeeds, to `Submitted`. A failed commit returns it to
/// `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SessionState {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "committing")]
    Committing,
    #[sea_orm(string_value = "submitted")]
    Submitted,
}

/// Sea-ORM entity model representing a submission session.
///
/// # Database Schema
///
/// | Column      | Type               | Description                          |
/// |-------------|--------------------|--------------------------------------|
/// | id          | TEXT (Primary Key) | Session ID                           |
/// | data        | BYTEA              | MessagePack serialized session record|
/// | expiry_date | TIMESTAMPTZ        | End of the inactivity window         |
/// | state       | VARCHAR(16)        | `active`, `committing`, `submitted`  |
/// | created_at  | TIMESTAMPTZ        | When the session was issued          |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "intake_session")]
pub struct Model {
    /// The session identifier, the string form of a `tower_sessions` id.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    pub data: Vec<u8>,

    /// Rows past this instant are treated as absent and swept by cleanup.
    pub expiry_date: DateTimeWithTimeZone,

    pub state: SessionState,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
