//! Message HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/chats/{id}/messages - Append a message to a chat
//! - GET    /api/v1/chats/{id}          - Oldest messages of a chat (`?limit=`)
//! - DELETE /api/v1/messages/{id}       - Delete a single message

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use parley_core::service::MessageOperations;
use parley_types::chat::{ChatId, MessageId};

use super::{parse_id, request_context};
use crate::http::error::AppError;
use crate::http::response::{ApiResponse, ChatMessages, MessageText};
use crate::state::AppState;

/// Request body for adding a message.
#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    pub text: String,
}

/// Query parameters for message listing. A missing limit means the default page.
#[derive(Debug, Deserialize, Default)]
pub struct MessageListQuery {
    pub limit: Option<i64>,
}

/// POST /api/v1/chats/{id}/messages - Add a message to a chat.
pub async fn add_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    payload: Result<Json<AddMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<MessageText>>), AppError> {
    let start = Instant::now();
    let ctx = request_context(&state);
    let chat_id: ChatId = parse_id(&chat_id, "chat")?;
    let Json(req) = payload?;

    let text = state
        .service
        .message
        .add_message(&ctx, chat_id, &req.text)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(MessageText { text }, ctx.request_id.to_string(), elapsed)
        .with_link("chat", &format!("/api/v1/chats/{chat_id}"));

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/chats/{id} - Get a chat's messages in chronological order.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    query: Result<Query<MessageListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ChatMessages>>, AppError> {
    let start = Instant::now();
    let ctx = request_context(&state);
    let chat_id: ChatId = parse_id(&chat_id, "chat")?;
    let Query(query) = query?;

    let messages = state
        .service
        .message
        .get_messages(&ctx, chat_id, query.limit.unwrap_or(0))
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let body = ChatMessages {
        id: chat_id.0,
        messages,
    };
    let resp = ApiResponse::success(body, ctx.request_id.to_string(), elapsed)
        .with_link("self", &format!("/api/v1/chats/{chat_id}"))
        .with_link("messages", &format!("/api/v1/chats/{chat_id}/messages"));

    Ok(Json(resp))
}

/// DELETE /api/v1/messages/{id} - Delete a message.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ctx = request_context(&state);
    let id: MessageId = parse_id(&id, "message")?;

    state.service.message.delete_message(&ctx, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
