use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Submission::Id).text().not_null().primary_key())
                    .col(
                        ColumnDef::new(Submission::IdempotencyKey)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Submission::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Submission::PhoneNumber).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Submission::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Submission::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(Submission::TenthPercentage).double().not_null())
                    .col(ColumnDef::new(Submission::TwelfthPercentage).double().not_null())
                    .col(ColumnDef::new(Submission::GraduationMarks).double().not_null())
                    .col(ColumnDef::new(Submission::CompanyName).string_len(255).not_null())
                    .col(ColumnDef::new(Submission::Domain).string_len(255).not_null())
                    .col(ColumnDef::new(Submission::YearsOfExperience).double().not_null())
                    .col(ColumnDef::new(Submission::LastSalary).double().not_null())
                    .col(
                        ColumnDef::new(Submission::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Submission {
    Table,
    Id,
    IdempotencyKey,
    Name,
    PhoneNumber,
    Email,
    DateOfBirth,
    TenthPercentage,
    TwelfthPercentage,
    GraduationMarks,
    CompanyName,
    Domain,
    YearsOfExperience,
    LastSalary,
    CreatedAt,
}
