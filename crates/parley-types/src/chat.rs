//! Chat and message types for Parley.
//!
//! A chat is a named conversation thread; messages are plain text entries
//! within a chat, ordered by creation time. Ids are assigned by persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Maximum chat title length in characters, measured after trimming.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum message text length in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Page size used when the caller asks for zero or a negative number of items.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Identifier of a chat, assigned by the store on insert and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Identifier of a message, assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A persisted chat thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    /// Trimmed title, unique across all chats (exact, case-sensitive).
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A chat that has passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChat {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl NewChat {
    /// Draft a chat stamped with the current time.
    pub fn now(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

/// A persisted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    /// Stored verbatim; whitespace is significant.
    pub text: String,
    /// Defines retrieval order within a chat.
    pub created_at: DateTime<Utc>,
}

/// A message that has passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    /// Draft a message stamped with the current time.
    pub fn now(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Count characters the way the length limits are defined (Unicode scalar values).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_id_roundtrips_through_str() {
        let id: ChatId = "42".parse().unwrap();
        assert_eq!(id, ChatId(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn chat_id_rejects_non_integer() {
        assert!("abc".parse::<ChatId>().is_err());
        assert!("1.5".parse::<ChatId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ChatId(7)).unwrap();
        assert_eq!(json, "7");
        let json = serde_json::to_string(&MessageId(9)).unwrap();
        assert_eq!(json, "9");
    }

    #[test]
    fn char_len_counts_scalars_not_bytes() {
        assert_eq!(char_len("Поддержка"), 9);
        assert!("Поддержка".len() > 9);
        assert_eq!(char_len(""), 0);
    }

    #[test]
    fn new_message_keeps_text_verbatim() {
        let msg = NewMessage::now(ChatId(1), "  spaced  ");
        assert_eq!(msg.text, "  spaced  ");
        assert_eq!(msg.chat_id, ChatId(1));
    }
}
