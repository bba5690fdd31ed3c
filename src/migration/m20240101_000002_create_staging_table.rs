use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StagingEntry::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StagingEntry::SessionId).text().not_null())
                    .col(ColumnDef::new(StagingEntry::Section).text().not_null())
                    .col(ColumnDef::new(StagingEntry::Data).binary().not_null())
                    .col(
                        ColumnDef::new(StagingEntry::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StagingEntry::ExpiryDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(StagingEntry::SessionId)
                            .col(StagingEntry::Section),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_staging_entry_expiry_date")
                    .table(StagingEntry::Table)
                    .col(StagingEntry::ExpiryDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StagingEntry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StagingEntry {
    Table,
    SessionId,
    Section,
    Data,
    UpdatedAt,
    ExpiryDate,
}
