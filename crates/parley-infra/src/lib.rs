//! Infrastructure layer for Parley.
//!
//! Contains the SQLite implementations of the repository traits defined in
//! `parley-core` and the configuration loader.

pub mod config;
pub mod sqlite;
