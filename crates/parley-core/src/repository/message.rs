//! Message repository trait definition.

use parley_types::chat::{ChatId, Message, MessageId, NewMessage};
use parley_types::error::RepositoryError;

/// Repository trait for message persistence.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MessageRepository: Send + Sync {
    /// Insert a message and return it with its assigned id.
    ///
    /// The referenced chat must exist; a dangling `chat_id` is a `Constraint` error.
    fn create(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;

    /// Get up to `limit` messages of a chat starting at `offset`,
    /// ordered by `created_at` ASC (ties by id ASC).
    fn list_by_chat(
        &self,
        chat_id: ChatId,
        limit: i64,
        offset: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Get a single message by id.
    fn get_by_id(
        &self,
        id: MessageId,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;

    /// Delete a single message. Returns `NotFound` if no message had this id.
    fn delete(
        &self,
        id: MessageId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
