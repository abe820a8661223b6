//! Shared domain types for Parley.
//!
//! This crate contains the domain types used across the Parley service:
//! Chat, Message, their drafts, configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
