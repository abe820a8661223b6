//! Chat HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/chats       - Create a chat
//! - GET    /api/v1/chats       - List chats, newest first
//! - PATCH  /api/v1/chats/{id}  - Rename a chat
//! - DELETE /api/v1/chats/{id}  - Delete a chat and its messages

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use parley_core::service::ChatOperations;
use parley_types::chat::{Chat, ChatId};

use super::{parse_id, request_context};
use crate::http::error::AppError;
use crate::http::response::{ApiResponse, ChatTitle};
use crate::state::AppState;

/// Request body for creating or renaming a chat.
#[derive(Debug, Deserialize)]
pub struct ChatTitleRequest {
    pub title: String,
}

/// Query parameters for chat listing. Missing values mean the defaults.
#[derive(Debug, Deserialize, Default)]
pub struct ChatListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/chats - Create a new chat.
pub async fn create_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatTitleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ChatTitle>>), AppError> {
    let start = Instant::now();
    let ctx = request_context(&state);
    let Json(req) = payload?;

    let title = state.service.chat.create_chat(&ctx, &req.title).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(ChatTitle { title }, ctx.request_id.to_string(), elapsed)
        .with_link("list", "/api/v1/chats");

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/chats - List chats.
pub async fn list_chats(
    State(state): State<AppState>,
    query: Result<Query<ChatListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Chat>>>, AppError> {
    let start = Instant::now();
    let ctx = request_context(&state);
    let Query(query) = query?;

    let chats = state
        .service
        .chat
        .list_chats(&ctx, query.limit.unwrap_or(0), query.offset.unwrap_or(0))
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(chats, ctx.request_id.to_string(), elapsed)
        .with_link("self", "/api/v1/chats");

    Ok(Json(resp))
}

/// PATCH /api/v1/chats/{id} - Rename a chat.
pub async fn rename_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChatTitleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Chat>>, AppError> {
    let start = Instant::now();
    let ctx = request_context(&state);
    let id: ChatId = parse_id(&id, "chat")?;
    let Json(req) = payload?;

    let chat = state.service.chat.rename_chat(&ctx, id, &req.title).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(chat, ctx.request_id.to_string(), elapsed)
        .with_link("self", &format!("/api/v1/chats/{id}"));

    Ok(Json(resp))
}

/// DELETE /api/v1/chats/{id} - Delete a chat.
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ctx = request_context(&state);
    let id: ChatId = parse_id(&id, "chat")?;

    state.service.chat.delete_chat(&ctx, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
