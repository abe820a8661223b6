//! Chat repository trait definition.

use parley_types::chat::{Chat, ChatId, NewChat};
use parley_types::error::RepositoryError;

/// Repository trait for chat persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ChatRepository: Send + Sync {
    /// Insert a chat and return it with its assigned id.
    ///
    /// Returns `Conflict` if a chat with the same title already exists and
    /// `Constraint` if the store rejects the row for any other integrity rule.
    fn create(
        &self,
        chat: &NewChat,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Get a chat by id. Returns `None` if it does not exist.
    fn get_by_id(
        &self,
        id: ChatId,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Whether a chat with exactly this title exists (case-sensitive).
    fn exists_by_title(
        &self,
        title: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// List chats, newest first.
    fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, RepositoryError>> + Send;

    /// Overwrite the title of an existing chat. Returns `NotFound` if absent.
    fn update(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Permanently delete a chat and, by cascade, all of its messages.
    ///
    /// Returns `NotFound` if no chat had this id.
    fn delete(
        &self,
        id: ChatId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
