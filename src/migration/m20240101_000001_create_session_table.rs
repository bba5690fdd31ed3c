use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IntakeSession::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IntakeSession::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(IntakeSession::Data).binary().not_null())
                    .col(
                        ColumnDef::new(IntakeSession::ExpiryDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IntakeSession::State).string_len(16).not_null())
                    .col(
                        ColumnDef::new(IntakeSession::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_intake_session_expiry_date")
                    .table(IntakeSession::Table)
                    .col(IntakeSession::ExpiryDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IntakeSession::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IntakeSession {
    Table,
    Id,
    Data,
    ExpiryDate,
    State,
    CreatedAt,
}
