//! Chat lifecycle service.
//!
//! Trims and validates titles, rejects duplicates, and creates, renames and
//! deletes chats. Uniqueness is checked before the insert, but the check and
//! the insert are not atomic: the store's unique constraint is what actually
//! guarantees it, and a lost race is reported as the same conflict.

use parley_types::chat::{Chat, ChatId, MAX_TITLE_CHARS, NewChat, char_len};
use parley_types::error::{RepositoryError, ServiceError};
use tracing::Span;

use super::{ChatOperations, normalize_limit};
use crate::context::RequestContext;
use crate::repository::ChatRepository;

const CHAT_EXISTS: &str = "chat already exists";
const CHAT_MISSING: &str = "chat does not exist";

/// Service enforcing the chat rules before delegating to a `ChatRepository`.
pub struct ChatService<R: ChatRepository> {
    repo: R,
    span: Span,
}

impl<R: ChatRepository> ChatService<R> {
    /// Create a new ChatService.
    ///
    /// - `repo`: persistence for chat records
    /// - `span`: parent span for every event this service emits
    pub fn new(repo: R, span: Span) -> Self {
        Self { repo, span }
    }

    /// Look up a chat, mapping absence to `NotFound`.
    async fn require_chat(&self, ctx: &RequestContext, id: ChatId) -> Result<Chat, ServiceError> {
        ctx.run(self.repo.get_by_id(id))
            .await
            .map_err(|e| ServiceError::persistence(format!("failed to get chat {id}"), e))?
            .ok_or_else(|| ServiceError::NotFound(CHAT_MISSING.to_string()))
    }
}

/// Trim a raw title and check its length. Returns the trimmed slice.
pub fn normalize_title(raw: &str) -> Result<&str, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("empty title".to_string()));
    }
    if char_len(trimmed) > MAX_TITLE_CHARS {
        return Err(ServiceError::Validation("title too long".to_string()));
    }
    Ok(trimmed)
}

impl<R: ChatRepository> ChatOperations for ChatService<R> {
    async fn create_chat(&self, ctx: &RequestContext, title: &str) -> Result<String, ServiceError> {
        let trimmed = match normalize_title(title) {
            Ok(trimmed) => trimmed,
            Err(err) => {
                tracing::warn!(
                    parent: &self.span,
                    request_id = %ctx.request_id,
                    chars = char_len(title.trim()),
                    "create chat rejected: {err}"
                );
                return Err(err);
            }
        };

        let exists = ctx
            .run(self.repo.exists_by_title(trimmed))
            .await
            .map_err(|e| {
                tracing::error!(parent: &self.span, request_id = %ctx.request_id, error = %e, "failed to check chat title");
                ServiceError::persistence("failed to check if chat exists", e)
            })?;

        if exists {
            tracing::warn!(parent: &self.span, request_id = %ctx.request_id, title = trimmed, "create chat rejected: duplicate title");
            return Err(ServiceError::Conflict(CHAT_EXISTS.to_string()));
        }

        let chat = match ctx.run(self.repo.create(&NewChat::now(trimmed))).await {
            Ok(chat) => chat,
            Err(RepositoryError::Conflict(_)) => {
                tracing::warn!(parent: &self.span, request_id = %ctx.request_id, title = trimmed, "create chat lost a race on title");
                return Err(ServiceError::Conflict(CHAT_EXISTS.to_string()));
            }
            Err(e) => {
                tracing::error!(parent: &self.span, request_id = %ctx.request_id, error = %e, "failed to create chat");
                return Err(ServiceError::persistence("failed to create chat", e));
            }
        };

        tracing::info!(parent: &self.span, request_id = %ctx.request_id, chat_id = %chat.id, title = %chat.title, "chat created");
        Ok(chat.title)
    }

    async fn delete_chat(&self, ctx: &RequestContext, id: ChatId) -> Result<(), ServiceError> {
        match ctx.run(self.repo.delete(id)).await {
            Ok(()) => {
                tracing::info!(parent: &self.span, request_id = %ctx.request_id, chat_id = %id, "chat deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(ServiceError::NotFound(CHAT_MISSING.to_string())),
            Err(e) => Err(ServiceError::persistence(format!("failed to delete chat {id}"), e)),
        }
    }

    async fn list_chats(
        &self,
        ctx: &RequestContext,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Chat>, ServiceError> {
        let limit = normalize_limit(limit)?;
        if offset < 0 {
            return Err(ServiceError::Validation("negative offset".to_string()));
        }

        ctx.run(self.repo.list(limit, offset))
            .await
            .map_err(|e| ServiceError::persistence("failed to list chats", e))
    }

    async fn rename_chat(
        &self,
        ctx: &RequestContext,
        id: ChatId,
        title: &str,
    ) -> Result<Chat, ServiceError> {
        let trimmed = normalize_title(title)?;
        let mut chat = self.require_chat(ctx, id).await?;
        chat.title = trimmed.to_string();

        match ctx.run(self.repo.update(&chat)).await {
            Ok(chat) => Ok(chat),
            Err(RepositoryError::NotFound) => Err(ServiceError::NotFound(CHAT_MISSING.to_string())),
            Err(RepositoryError::Conflict(_)) => Err(ServiceError::Conflict(CHAT_EXISTS.to_string())),
            Err(e) => Err(ServiceError::persistence(format!("failed to rename chat {id}"), e)),
        }
    }
}
