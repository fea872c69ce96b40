//! Direct message handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::models::chat::ChatMessage;
use crate::services::chat_service::NewMessage;
use crate::Result;

use super::{require_actor, AppState};

/// Conversation page plus the polling contract.
///
/// There is no push channel; clients re-fetch after `poll_after_seconds`.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    /// Messages in creation order, both directions.
    pub messages: Vec<ChatMessage>,
    /// Seconds the client should wait before polling again.
    pub poll_after_seconds: u64,
}

/// `POST /messages` — send a message under the caller's identity.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the sender field is not the caller.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new_message): Json<NewMessage>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    let actor = require_actor(&state, &headers).await?;
    let message = state.chat_service().send(&actor, new_message).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /messages/{peer_id}` — fetch a conversation, marking unread
/// messages addressed to the caller as read.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown peer.
pub async fn conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(peer_id): Path<String>,
) -> Result<Json<ConversationResponse>> {
    let actor = require_actor(&state, &headers).await?;
    let messages = state.chat_service().conversation(&actor, &peer_id).await?;
    Ok(Json(ConversationResponse {
        messages,
        poll_after_seconds: state.config.chat_poll_seconds,
    }))
}
