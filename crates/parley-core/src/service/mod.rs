//! Business logic services (use cases).
//!
//! Services validate caller input, enforce the chat/message rules, and then
//! delegate to the repository traits (ports) -- never to concrete
//! infrastructure. Each service is stateless per call and receives its
//! logging span at construction.

pub mod chat;
pub mod message;

use std::future::Future;

use parley_types::chat::{Chat, ChatId, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MessageId};
use parley_types::error::ServiceError;

use crate::context::RequestContext;

pub use chat::ChatService;
pub use message::MessageService;

/// Chat lifecycle operations exposed to the transport layer.
pub trait ChatOperations: Send + Sync {
    /// Validate, de-duplicate and store a chat. Returns the trimmed title.
    fn create_chat(
        &self,
        ctx: &RequestContext,
        title: &str,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;

    /// Delete a chat and, by cascade, its messages.
    fn delete_chat(
        &self,
        ctx: &RequestContext,
        id: ChatId,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Page through chats, newest first.
    fn list_chats(
        &self,
        ctx: &RequestContext,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<Chat>, ServiceError>> + Send;

    /// Change a chat's title. The title is validated like on creation.
    fn rename_chat(
        &self,
        ctx: &RequestContext,
        id: ChatId,
        title: &str,
    ) -> impl Future<Output = Result<Chat, ServiceError>> + Send;
}

/// Message operations exposed to the transport layer.
pub trait MessageOperations: Send + Sync {
    /// Append a message to an existing chat. Returns the text unchanged.
    fn add_message(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        text: &str,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;

    /// The oldest `limit` message texts of a chat, in chronological order.
    fn get_messages(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<String>, ServiceError>> + Send;

    fn delete_message(
        &self,
        ctx: &RequestContext,
        id: MessageId,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// Both capabilities, held as named fields.
pub struct Service<C: ChatOperations, M: MessageOperations> {
    pub chat: C,
    pub message: M,
}

impl<C: ChatOperations, M: MessageOperations> Service<C, M> {
    pub fn new(chat: C, message: M) -> Self {
        Self { chat, message }
    }
}

/// Apply the page-size rules: non-positive means the default, and anything
/// above the maximum is rejected.
pub fn normalize_limit(limit: i64) -> Result<i64, ServiceError> {
    let limit = if limit <= 0 { DEFAULT_PAGE_LIMIT } else { limit };
    if limit > MAX_PAGE_LIMIT {
        return Err(ServiceError::Validation("limit too large".to_string()));
    }
    Ok(limit)
}
