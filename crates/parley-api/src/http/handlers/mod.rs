//! HTTP request handlers for the REST API.

pub mod chat;
pub mod message;

use std::time::Duration;

use parley_core::context::RequestContext;

use crate::http::error::AppError;
use crate::state::AppState;

/// Build the per-request context, bounded by the configured request timeout.
pub(crate) fn request_context(state: &AppState) -> RequestContext {
    RequestContext::with_timeout(Duration::from_secs(state.config.server.request_timeout_secs))
}

/// Parse a numeric id from a path segment, returning a 400 on bad input.
pub(crate) fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|_| AppError::Validation(format!("invalid {what} id: {raw}")))
}
