//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod chat;
pub mod message;
pub mod pool;

use chrono::{DateTime, SecondsFormat, Utc};
use parley_types::error::RepositoryError;

pub use chat::SqliteChatRepository;
pub use message::SqliteMessageRepository;
pub use pool::DatabasePool;

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so that `ORDER BY created_at` sorts chronologically.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Map a sqlx error to the repository taxonomy.
///
/// `what` names the entity for conflict messages.
fn map_sqlx_error(err: sqlx::Error, what: &str) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE") => {
            RepositoryError::Conflict(format!("{what} already exists"))
        }
        sqlx::Error::Database(db_err)
            if db_err.message().contains("CHECK") || db_err.message().contains("FOREIGN KEY") =>
        {
            RepositoryError::Constraint(db_err.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}
