//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parley-core` using sqlx with split read/write pools.

use parley_core::repository::ChatRepository;
use parley_types::chat::{Chat, ChatId, NewChat};
use parley_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_error, parse_datetime};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Chat.
struct ChatRow {
    id: i64,
    title: String,
    created_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        Ok(Chat {
            id: ChatId(self.id),
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn row_to_chat(row: &sqlx::sqlite::SqliteRow) -> Result<Chat, RepositoryError> {
    ChatRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_chat()
}

impl ChatRepository for SqliteChatRepository {
    async fn create(&self, chat: &NewChat) -> Result<Chat, RepositoryError> {
        let result = sqlx::query("INSERT INTO chats (title, created_at) VALUES (?, ?)")
            .bind(&chat.title)
            .bind(format_datetime(&chat.created_at))
            .execute(&self.pool.writer)
            .await;

        match result {
            Ok(done) => Ok(Chat {
                id: ChatId(done.last_insert_rowid()),
                title: chat.title.clone(),
                created_at: chat.created_at,
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("title '{}' already exists", chat.title)),
            ),
            Err(e) => Err(map_sqlx_error(e, "chat")),
        }
    }

    async fn get_by_id(&self, id: ChatId) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT id, title, created_at FROM chats WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| map_sqlx_error(e, "chat"))?;

        row.as_ref().map(row_to_chat).transpose()
    }

    async fn exists_by_title(&self, title: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM chats WHERE title = ?) AS found")
            .bind(title)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| map_sqlx_error(e, "chat"))?;

        let found: i64 = row
            .try_get("found")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(found != 0)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Chat>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, title, created_at FROM chats ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| map_sqlx_error(e, "chat"))?;

        rows.iter().map(row_to_chat).collect()
    }

    async fn update(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        let result = sqlx::query("UPDATE chats SET title = ? WHERE id = ?")
            .bind(&chat.title)
            .bind(chat.id.0)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE") => {
                    RepositoryError::Conflict(format!("title '{}' already exists", chat.title))
                }
                other => map_sqlx_error(other, "chat"),
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        // created_at is immutable, so re-read it rather than trusting the caller.
        let row = sqlx::query("SELECT id, title, created_at FROM chats WHERE id = ?")
            .bind(chat.id.0)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(|e| map_sqlx_error(e, "chat"))?;
        row_to_chat(&row)
    }

    async fn delete(&self, id: ChatId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| map_sqlx_error(e, "chat"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
