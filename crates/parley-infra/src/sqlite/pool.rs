//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` pairs a
//! multi-connection reader pool for concurrent reads with a single-connection
//! writer pool for serialized writes. Both use WAL journal mode and enforce
//! foreign keys, which the message cascade relies on.

use std::str::FromStr;
use std::time::Duration;

use parley_types::config::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Migrations under the workspace `migrations/` directory, embedded at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: multi-connection, read-only pool for SELECT queries.
/// - `writer`: single-connection pool for INSERT/UPDATE/DELETE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open both pools, applying pending migrations on the writer before the
    /// read-only reader pool is opened.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(&config.url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        let applied = run_migrations(&writer).await?;
        tracing::debug!(applied, url = %config.url, "database migrations checked");

        let reader = SqlitePoolOptions::new()
            .max_connections(config.max_read_connections.max(1))
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }

    /// Open a pool for a bare URL with default pool settings.
    pub async fn from_url(url: &str) -> Result<Self, sqlx::Error> {
        Self::new(&DatabaseConfig {
            url: url.to_string(),
            ..DatabaseConfig::default()
        })
        .await
    }

    /// Close both pools, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

/// Apply pending migrations. Returns how many were newly applied.
pub async fn run_migrations(writer: &SqlitePool) -> Result<usize, sqlx::Error> {
    let before = applied_count(writer).await;
    MIGRATOR.run(writer).await?;
    let after = applied_count(writer).await;
    Ok(after.saturating_sub(before))
}

async fn applied_count(pool: &SqlitePool) -> usize {
    // The bookkeeping table does not exist before the first run.
    sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .map(|(n,)| n as usize)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_url(name: &str) -> String {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join(name).display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        url
    }

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let pool = DatabasePool::from_url(&temp_url("test.db")).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(table_names, vec!["chats", "messages"]);
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let pool = DatabasePool::from_url(&temp_url("wal.db")).await.unwrap();

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_pool_foreign_keys_enforced() {
        let pool = DatabasePool::from_url(&temp_url("fk.db")).await.unwrap();

        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0, 1, "foreign keys should be enabled");
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let url = temp_url("idem.db");
        let pool = DatabasePool::from_url(&url).await.unwrap();
        assert_eq!(run_migrations(&pool.writer).await.unwrap(), 0);
        pool.close().await;

        // Reopening an already migrated database applies nothing new.
        let pool = DatabasePool::from_url(&url).await.unwrap();
        assert_eq!(run_migrations(&pool.writer).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reader_pool_is_read_only() {
        let pool = DatabasePool::from_url(&temp_url("ro.db")).await.unwrap();

        let result = sqlx::query("INSERT INTO chats (title, created_at) VALUES ('x', 'y')")
            .execute(&pool.reader)
            .await;
        assert!(result.is_err());
    }
}
