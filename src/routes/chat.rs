use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use super::AppState;
use crate::agent::{ChatReply, HistoryMessage};
use crate::error::ApiResult;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<HistoryMessage>,
}

/// POST /api/chat - model failures come back as an apology reply
#[tracing::instrument(skip(state, payload), fields(history = payload.conversation_history.len()))]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    payload.validate()?;

    let reply = match state
        .agent
        .process_message(&payload.message, &payload.conversation_history)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "Chat request failed");
            ChatReply::apology(&e)
        }
    };

    Ok(Json(reply))
}
