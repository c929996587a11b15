//! SQLite pool construction and embedded schema migrations

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::AppResult;

/// Schema migrations, embedded at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open the connection pool and bring the schema up to date.
///
/// WAL journaling lets readers run alongside the single writer, and foreign
/// keys are switched on explicitly since SQLite leaves them off by default.
pub async fn connect(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(config.busy_timeout())
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await?;

    info!(
        url = %config.url,
        max_connections = config.max_connections,
        "database pool created"
    );

    MIGRATOR.run(&pool).await?;
    info!("database migrations completed");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_in_memory_applies_schema() {
        let pool = connect(&DatabaseConfig::in_memory()).await.unwrap();

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(books, 0);
    }

    #[tokio::test]
    async fn connect_creates_missing_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libris.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            ..DatabaseConfig::in_memory()
        };

        let pool = connect(&config).await.unwrap();
        assert!(path.exists());

        let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(students, 0);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect(&DatabaseConfig::in_memory()).await.unwrap();
        MIGRATOR.run(&pool).await.unwrap();
    }
}
