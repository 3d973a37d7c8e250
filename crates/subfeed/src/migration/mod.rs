//! Database migrations for the subfeed schema.
//!
//! This module is only available when the `migrate` feature is enabled.

pub use sea_orm_migration::prelude::*;

mod m20261017_000001_create_cache_blob;

/// The migrator that runs all migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261017_000001_create_cache_blob::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("subfeed_migrations").into_iden()
    }
}
