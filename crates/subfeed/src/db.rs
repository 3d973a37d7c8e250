//! Database connection utilities.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Pragmas applied to every SQLite connection.
///
/// WAL lets the CLI read the cache while another invocation writes it, and the
/// busy timeout waits for that writer instead of failing.
const SQLITE_PRAGMAS: &[&str] = &[
    "PRAGMA journal_mode=WAL",
    "PRAGMA busy_timeout=5000",
    "PRAGMA synchronous=NORMAL",
];

async fn configure_sqlite(db: &DatabaseConnection) -> Result<(), DbErr> {
    for pragma in SQLITE_PRAGMAS {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            pragma.to_string(),
        ))
        .await?;
    }
    Ok(())
}

fn is_sqlite(database_url: &str) -> bool {
    database_url.starts_with("sqlite:")
}

/// Establish a connection to the database.
///
/// SQLite URLs (`sqlite://path/to/subfeed.db?mode=rwc`, `sqlite::memory:`)
/// get WAL journaling, a 5 second busy timeout and `synchronous=NORMAL`.
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    if is_sqlite(database_url) {
        configure_sqlite(&db).await?;
    }

    Ok(db)
}

/// Establish a connection and run all pending migrations.
///
/// # Example
/// ```ignore
/// let db = subfeed::connect_and_migrate("sqlite://subfeed.db?mode=rwc").await?;
/// let store = subfeed::store::DbStore::new(db);
/// ```
#[cfg(feature = "migrate")]
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let db = connect(database_url).await?;
    crate::migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn configure_sqlite_runs_all_pragmas() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results(SQLITE_PRAGMAS.iter().map(|_| MockExecResult {
                rows_affected: 0,
                last_insert_id: 0,
            }))
            .into_connection();

        configure_sqlite(&db)
            .await
            .expect("mock sqlite pragma execs should succeed");

        let log = db.into_transaction_log();
        assert_eq!(log.len(), SQLITE_PRAGMAS.len());
    }

    #[test]
    fn sqlite_urls_are_detected() {
        assert!(is_sqlite("sqlite::memory:"));
        assert!(is_sqlite("sqlite://subfeed.db?mode=rwc"));
        assert!(!is_sqlite("postgres:///subfeed"));
    }

    #[tokio::test]
    async fn connect_returns_error_for_invalid_database_url() {
        let err = connect("this-is-not-a-db-url")
            .await
            .expect_err("invalid URL should error");
        let msg = err.to_string().to_ascii_lowercase();
        assert!(
            msg.contains("error") || msg.contains("invalid"),
            "unexpected error message: {err}"
        );
    }

    #[cfg(feature = "migrate")]
    #[tokio::test]
    async fn connect_and_migrate_creates_cache_table() {
        use crate::entity::prelude::CacheBlob;
        use sea_orm::EntityTrait;

        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("in-memory database should migrate");
        let rows = CacheBlob::find().all(&db).await.expect("table exists");
        assert!(rows.is_empty());
    }
}
