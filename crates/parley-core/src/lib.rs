//! Business rules and repository trait definitions for Parley.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the chat and message services that validate input
//! before touching storage. It never depends on `parley-infra` or any
//! database crate.

pub mod context;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
