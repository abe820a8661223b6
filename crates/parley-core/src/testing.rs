//! In-memory repositories for service tests.
//!
//! `InMemoryStore` implements both repository traits over one shared state so
//! cascade deletes behave like the SQLite schema. Individual operations can be
//! made to fail or hang to exercise error and cancellation paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use parley_types::chat::{Chat, ChatId, Message, MessageId, NewChat, NewMessage};
use parley_types::error::RepositoryError;

use crate::repository::{ChatRepository, MessageRepository};

#[derive(Default)]
struct State {
    chats: Vec<Chat>,
    messages: Vec<Message>,
    next_chat_id: i64,
    next_message_id: i64,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, fn() -> RepositoryError>,
    hanging: HashSet<&'static str>,
    reverse_listing: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `op` fail with the error built by `make_err`.
    pub fn fail_on(&self, op: &'static str, make_err: fn() -> RepositoryError) {
        self.state.lock().unwrap().failures.insert(op, make_err);
    }

    /// Make every call to `op` wait forever.
    pub fn hang_on(&self, op: &'static str) {
        self.state.lock().unwrap().hanging.insert(op);
    }

    /// Return message pages newest-first to simulate a store that ignores ORDER BY.
    pub fn reverse_listing(&self) {
        self.state.lock().unwrap().reverse_listing = true;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn chat_count(&self) -> usize {
        self.state.lock().unwrap().chats.len()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn seed_chat(&self, title: &str) -> Chat {
        let mut state = self.state.lock().unwrap();
        state.next_chat_id += 1;
        let chat = Chat {
            id: ChatId(state.next_chat_id),
            title: title.to_string(),
            created_at: Utc::now(),
        };
        state.chats.push(chat.clone());
        chat
    }

    pub fn seed_message(&self, chat_id: ChatId, text: &str, created_at: DateTime<Utc>) -> Message {
        let mut state = self.state.lock().unwrap();
        state.next_message_id += 1;
        let message = Message {
            id: MessageId(state.next_message_id),
            chat_id,
            text: text.to_string(),
            created_at,
        };
        state.messages.push(message.clone());
        message
    }

    /// Record the call, then report whether it should hang or fail.
    fn enter(&self, op: &'static str) -> (bool, Option<RepositoryError>) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        let hang = state.hanging.contains(op);
        let failure = state.failures.get(op).map(|make_err| make_err());
        (hang, failure)
    }

    async fn check(&self, op: &'static str) -> Result<(), RepositoryError> {
        let (hang, failure) = self.enter(op);
        if hang {
            std::future::pending::<()>().await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ChatRepository for InMemoryStore {
    async fn create(&self, chat: &NewChat) -> Result<Chat, RepositoryError> {
        self.check("chat.create").await?;
        let mut state = self.state.lock().unwrap();
        if state.chats.iter().any(|c| c.title == chat.title) {
            return Err(RepositoryError::Conflict(format!(
                "title '{}' already exists",
                chat.title
            )));
        }
        state.next_chat_id += 1;
        let created = Chat {
            id: ChatId(state.next_chat_id),
            title: chat.title.clone(),
            created_at: chat.created_at,
        };
        state.chats.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: ChatId) -> Result<Option<Chat>, RepositoryError> {
        self.check("chat.get_by_id").await?;
        let state = self.state.lock().unwrap();
        Ok(state.chats.iter().find(|c| c.id == id).cloned())
    }

    async fn exists_by_title(&self, title: &str) -> Result<bool, RepositoryError> {
        self.check("chat.exists_by_title").await?;
        let state = self.state.lock().unwrap();
        Ok(state.chats.iter().any(|c| c.title == title))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Chat>, RepositoryError> {
        self.check("chat.list").await?;
        let state = self.state.lock().unwrap();
        let mut chats = state.chats.clone();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(chats
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        self.check("chat.update").await?;
        let mut state = self.state.lock().unwrap();
        if state
            .chats
            .iter()
            .any(|c| c.id != chat.id && c.title == chat.title)
        {
            return Err(RepositoryError::Conflict(format!(
                "title '{}' already exists",
                chat.title
            )));
        }
        let existing = state
            .chats
            .iter_mut()
            .find(|c| c.id == chat.id)
            .ok_or(RepositoryError::NotFound)?;
        existing.title = chat.title.clone();
        Ok(existing.clone())
    }

    async fn delete(&self, id: ChatId) -> Result<(), RepositoryError> {
        self.check("chat.delete").await?;
        let mut state = self.state.lock().unwrap();
        let before = state.chats.len();
        state.chats.retain(|c| c.id != id);
        if state.chats.len() == before {
            return Err(RepositoryError::NotFound);
        }
        state.messages.retain(|m| m.chat_id != id);
        Ok(())
    }
}

impl MessageRepository for InMemoryStore {
    async fn create(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        self.check("message.create").await?;
        let mut state = self.state.lock().unwrap();
        if !state.chats.iter().any(|c| c.id == message.chat_id) {
            return Err(RepositoryError::Constraint(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        state.next_message_id += 1;
        let created = Message {
            id: MessageId(state.next_message_id),
            chat_id: message.chat_id,
            text: message.text.clone(),
            created_at: message.created_at,
        };
        state.messages.push(created.clone());
        Ok(created)
    }

    async fn list_by_chat(
        &self,
        chat_id: ChatId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        self.check("message.list_by_chat").await?;
        let state = self.state.lock().unwrap();
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let mut page: Vec<Message> = messages
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        if state.reverse_listing {
            page.reverse();
        }
        Ok(page)
    }

    async fn get_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        self.check("message.get_by_id").await?;
        let state = self.state.lock().unwrap();
        Ok(state.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        self.check("message.delete").await?;
        let mut state = self.state.lock().unwrap();
        let before = state.messages.len();
        state.messages.retain(|m| m.id != id);
        if state.messages.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
