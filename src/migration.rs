pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_session_table;
mod m20240101_000002_create_staging_table;
mod m20240101_000003_create_submission_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Keep our bookkeeping apart from any host application's migrations
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("staged_intake_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_session_table::Migration),
            Box::new(m20240101_000002_create_staging_table::Migration),
            Box::new(m20240101_000003_create_submission_table::Migration),
        ]
    }
}
