//! Message service.
//!
//! Appends messages to existing chats and returns a chat's messages in
//! chronological order, whatever order the store hands them back in.

use parley_types::chat::{ChatId, MAX_TEXT_CHARS, MessageId, NewMessage, char_len};
use parley_types::error::{RepositoryError, ServiceError};
use tracing::Span;

use super::{MessageOperations, normalize_limit};
use crate::context::RequestContext;
use crate::repository::{ChatRepository, MessageRepository};

/// Service enforcing the message rules.
///
/// Needs the chat repository as well: a message may only be added to, and
/// listed from, a chat that exists.
pub struct MessageService<C: ChatRepository, M: MessageRepository> {
    chats: C,
    messages: M,
    span: Span,
}

impl<C: ChatRepository, M: MessageRepository> MessageService<C, M> {
    pub fn new(chats: C, messages: M, span: Span) -> Self {
        Self {
            chats,
            messages,
            span,
        }
    }

    async fn ensure_chat(&self, ctx: &RequestContext, chat_id: ChatId) -> Result<(), ServiceError> {
        let chat = ctx
            .run(self.chats.get_by_id(chat_id))
            .await
            .map_err(|e| ServiceError::persistence(format!("failed to get chat {chat_id}"), e))?;

        match chat {
            Some(_) => Ok(()),
            None => {
                tracing::debug!(parent: &self.span, request_id = %ctx.request_id, chat_id = %chat_id, "chat not found");
                Err(ServiceError::NotFound("chat does not exist".to_string()))
            }
        }
    }
}

/// Check message text. Text is not trimmed, so whitespace-only is accepted.
pub fn validate_text(text: &str) -> Result<(), ServiceError> {
    if text.is_empty() {
        return Err(ServiceError::Validation("empty text".to_string()));
    }
    if char_len(text) > MAX_TEXT_CHARS {
        return Err(ServiceError::Validation("text too long".to_string()));
    }
    Ok(())
}

impl<C: ChatRepository, M: MessageRepository> MessageOperations for MessageService<C, M> {
    async fn add_message(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        text: &str,
    ) -> Result<String, ServiceError> {
        self.ensure_chat(ctx, chat_id).await?;

        if let Err(err) = validate_text(text) {
            tracing::warn!(
                parent: &self.span,
                request_id = %ctx.request_id,
                chat_id = %chat_id,
                chars = char_len(text),
                "add message rejected: {err}"
            );
            return Err(err);
        }

        let message = ctx
            .run(self.messages.create(&NewMessage::now(chat_id, text)))
            .await
            .map_err(|e| {
                tracing::error!(parent: &self.span, request_id = %ctx.request_id, chat_id = %chat_id, error = %e, "failed to create message");
                ServiceError::persistence("failed to create message", e)
            })?;

        tracing::info!(
            parent: &self.span,
            request_id = %ctx.request_id,
            chat_id = %chat_id,
            message_id = %message.id,
            "message added"
        );
        Ok(message.text)
    }

    async fn get_messages(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        limit: i64,
    ) -> Result<Vec<String>, ServiceError> {
        let limit = normalize_limit(limit)?;
        self.ensure_chat(ctx, chat_id).await?;

        let mut messages = ctx
            .run(self.messages.list_by_chat(chat_id, limit, 0))
            .await
            .map_err(|e| ServiceError::persistence(format!("failed to get messages for chat {chat_id}"), e))?;

        // Stable: equal timestamps keep the store's order.
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        tracing::debug!(parent: &self.span, request_id = %ctx.request_id, chat_id = %chat_id, count = messages.len(), "messages listed");
        Ok(messages.into_iter().map(|m| m.text).collect())
    }

    async fn delete_message(&self, ctx: &RequestContext, id: MessageId) -> Result<(), ServiceError> {
        match ctx.run(self.messages.delete(id)).await {
            Ok(()) => {
                tracing::info!(parent: &self.span, request_id = %ctx.request_id, message_id = %id, "message deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                Err(ServiceError::NotFound("message does not exist".to_string()))
            }
            Err(e) => Err(ServiceError::persistence(format!("failed to delete message {id}"), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ChatOperations, ChatService};
    use crate::testing::InMemoryStore;
    use chrono::{Duration as ChronoDuration, Utc};

    fn service(store: &InMemoryStore) -> MessageService<InMemoryStore, InMemoryStore> {
        MessageService::new(store.clone(), store.clone(), Span::none())
    }

    #[tokio::test]
    async fn add_message_returns_text_unchanged() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Support");
        let svc = service(&store);

        let text = svc
            .add_message(&RequestContext::new(), chat.id, "  Привет, мир!  ")
            .await
            .unwrap();

        assert_eq!(text, "  Привет, мир!  ");
        assert_eq!(store.message_count(), 1);
    }

    #[tokio::test]
    async fn add_message_accepts_whitespace_only_text() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Support");
        let svc = service(&store);

        assert_eq!(
            svc.add_message(&RequestContext::new(), chat.id, "   ").await.unwrap(),
            "   "
        );
    }

    #[tokio::test]
    async fn add_message_text_length_bounds() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Support");
        let svc = service(&store);
        let ctx = RequestContext::new();

        let max = "a".repeat(5000);
        assert_eq!(svc.add_message(&ctx, chat.id, &max).await.unwrap(), max);

        let err = svc
            .add_message(&ctx, chat.id, &"a".repeat(5001))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("text too long"));

        let err = svc.add_message(&ctx, chat.id, "").await.unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("empty text"));

        assert_eq!(store.message_count(), 1);
    }

    #[tokio::test]
    async fn add_message_to_missing_chat_is_not_found_before_validation() {
        let store = InMemoryStore::new();
        let svc = service(&store);

        // Empty text would be a validation error, but the chat lookup comes first.
        let err = svc
            .add_message(&RequestContext::new(), ChatId(7), "")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.calls(), vec!["chat.get_by_id"]);
    }

    #[tokio::test]
    async fn add_message_lookup_failure_is_persistence_error() {
        let store = InMemoryStore::new();
        store.fail_on("chat.get_by_id", || RepositoryError::Connection);
        let svc = service(&store);

        let err = svc
            .add_message(&RequestContext::new(), ChatId(1), "hi")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Persistence { source: RepositoryError::Connection, .. }
        ));
    }

    #[tokio::test]
    async fn add_message_create_failure_is_persistence_error() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Support");
        store.fail_on("message.create", || RepositoryError::Query("disk full".into()));
        let svc = service(&store);

        let err = svc
            .add_message(&RequestContext::new(), chat.id, "hi")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to create message"));
        assert_eq!(store.message_count(), 0);
    }

    #[tokio::test]
    async fn add_message_cancelled_while_storing() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Support");
        store.hang_on("message.create");
        let svc = service(&store);

        let ctx = RequestContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = svc.add_message(&ctx, chat.id, "hi").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Persistence { source: RepositoryError::Cancelled, .. }
        ));
        assert_eq!(store.message_count(), 0);
    }

    #[tokio::test]
    async fn get_messages_limit_too_large_wins_over_missing_chat() {
        let store = InMemoryStore::new();
        let svc = service(&store);

        let err = svc
            .get_messages(&RequestContext::new(), ChatId(404), 101)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().contains("limit too large"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn get_messages_missing_chat_is_not_found() {
        let store = InMemoryStore::new();
        let svc = service(&store);

        let err = svc
            .get_messages(&RequestContext::new(), ChatId(404), 10)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn get_messages_default_limit_is_twenty() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Busy");
        let base = Utc::now();
        for i in 0..25 {
            store.seed_message(chat.id, &format!("m{i}"), base + ChronoDuration::seconds(i));
        }
        let svc = service(&store);
        let ctx = RequestContext::new();

        let texts = svc.get_messages(&ctx, chat.id, 0).await.unwrap();
        assert_eq!(texts.len(), 20);
        assert_eq!(texts.first().map(String::as_str), Some("m0"));
        assert_eq!(texts.last().map(String::as_str), Some("m19"));

        assert_eq!(svc.get_messages(&ctx, chat.id, -3).await.unwrap().len(), 20);
        assert_eq!(svc.get_messages(&ctx, chat.id, 100).await.unwrap().len(), 25);
        assert_eq!(svc.get_messages(&ctx, chat.id, 2).await.unwrap(), vec!["m0", "m1"]);
    }

    #[tokio::test]
    async fn get_messages_is_chronological_regardless_of_store_order() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Order");
        let base = Utc::now();
        store.seed_message(chat.id, "third", base + ChronoDuration::seconds(2));
        store.seed_message(chat.id, "first", base);
        store.seed_message(chat.id, "second", base + ChronoDuration::seconds(1));
        store.reverse_listing();
        let svc = service(&store);

        let texts = svc
            .get_messages(&RequestContext::new(), chat.id, 10)
            .await
            .unwrap();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn get_messages_empty_chat_returns_empty_list() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Quiet");
        let svc = service(&store);

        let texts = svc
            .get_messages(&RequestContext::new(), chat.id, 0)
            .await
            .unwrap();
        assert!(texts.is_empty());
    }

    #[tokio::test]
    async fn get_messages_list_failure_is_persistence_error() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Broken");
        store.fail_on("message.list_by_chat", || RepositoryError::Query("boom".into()));
        let svc = service(&store);

        let err = svc
            .get_messages(&RequestContext::new(), chat.id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Persistence { .. }));
    }

    #[tokio::test]
    async fn support_chat_scenario() {
        let store = InMemoryStore::new();
        let chats = ChatService::new(store.clone(), Span::none());
        let svc = service(&store);
        let ctx = RequestContext::new();

        assert_eq!(chats.create_chat(&ctx, "Support").await.unwrap(), "Support");
        assert!(chats.create_chat(&ctx, " Support ").await.unwrap_err().is_conflict());

        let chat = chats.list_chats(&ctx, 0, 0).await.unwrap().remove(0);
        let err = svc
            .add_message(&ctx, chat.id, &"a".repeat(5001))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(svc.add_message(&ctx, chat.id, "hi").await.unwrap(), "hi");
        assert_eq!(svc.get_messages(&ctx, chat.id, 0).await.unwrap(), vec!["hi"]);

        chats.delete_chat(&ctx, chat.id).await.unwrap();
        assert!(svc.get_messages(&ctx, chat.id, 0).await.unwrap_err().is_not_found());
        assert_eq!(store.message_count(), 0);
    }

    #[tokio::test]
    async fn delete_message_removes_only_that_message() {
        let store = InMemoryStore::new();
        let chat = store.seed_chat("Support");
        let now = Utc::now();
        let first = store.seed_message(chat.id, "keep", now);
        let second = store.seed_message(chat.id, "drop", now + ChronoDuration::seconds(1));
        let svc = service(&store);
        let ctx = RequestContext::new();

        svc.delete_message(&ctx, second.id).await.unwrap();
        assert_eq!(svc.get_messages(&ctx, chat.id, 0).await.unwrap(), vec!["keep"]);

        let err = svc.delete_message(&ctx, second.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_ne!(first.id, second.id);
    }
}
