use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{
    repo,
    repo_types::{ChatMessage, ChatMessageView, DEFAULT_ROOM_ID},
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

const HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendMessageRequest {
    pub content: String,
}

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat/messages", get(list_messages).post(send_message))
}

#[instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<ChatMessageView>>> {
    let rows = repo::recent_messages(&state.db, DEFAULT_ROOM_ID, HISTORY_LIMIT).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<SendMessageRequest>,
) -> AppResult<Json<ChatMessage>> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Message content is required"));
    }
    let message = repo::insert_message(&state.db, DEFAULT_ROOM_ID, user.id, content).await?;
    info!(user_id = %user.id, message_id = message.id, "chat message sent");
    Ok(Json(message))
}
