//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (parley-infra) implements. Ids and timestamps flow through unchanged; the
//! store assigns ids on insert.

pub mod chat;
pub mod message;

pub use chat::ChatRepository;
pub use message::MessageRepository;
