//! Component spans.
//!
//! Services receive their span at construction and emit every event under it,
//! so the component shows up on each log line without a global logger.

use tracing::Span;

pub const CHAT_SERVICE: &str = "chat_service";
pub const MESSAGE_SERVICE: &str = "message_service";

/// Long-lived span identifying one application component.
pub fn component_span(component: &'static str) -> Span {
    tracing::info_span!("component", component)
}

pub fn chat_service_span() -> Span {
    component_span(CHAT_SERVICE)
}

pub fn message_service_span() -> Span {
    component_span(MESSAGE_SERVICE)
}
