//! SQLite message repository implementation.

use parley_core::repository::MessageRepository;
use parley_types::chat::{ChatId, Message, MessageId, NewMessage};
use parley_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_error, parse_datetime};

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MessageRow {
    id: i64,
    chat_id: i64,
    text: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        Ok(Message {
            id: MessageId(self.id),
            chat_id: ChatId(self.chat_id),
            text: self.text,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message, RepositoryError> {
    MessageRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_message()
}

impl MessageRepository for SqliteMessageRepository {
    async fn create(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        let result =
            sqlx::query("INSERT INTO messages (chat_id, text, created_at) VALUES (?, ?, ?)")
                .bind(message.chat_id.0)
                .bind(&message.text)
                .bind(format_datetime(&message.created_at))
                .execute(&self.pool.writer)
                .await
                .map_err(|e| map_sqlx_error(e, "message"))?;

        Ok(Message {
            id: MessageId(result.last_insert_rowid()),
            chat_id: message.chat_id,
            text: message.text.clone(),
            created_at: message.created_at,
        })
    }

    async fn list_by_chat(
        &self,
        chat_id: ChatId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, chat_id, text, created_at FROM messages
             WHERE chat_id = ?
             ORDER BY created_at ASC, id ASC
             LIMIT ? OFFSET ?",
        )
        .bind(chat_id.0)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| map_sqlx_error(e, "message"))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn get_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query("SELECT id, chat_id, text, created_at FROM messages WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| map_sqlx_error(e, "message"))?;

        row.as_ref().map(row_to_message).transpose()
    }

    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| map_sqlx_error(e, "message"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
