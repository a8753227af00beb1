use crate::{
    AppState,
    types::{AppError, ChatRequest, ChatResponse, Result},
};
use axum::{Json, extract::State};

/// Answer one message with a fresh agent run
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if payload.message.trim().is_empty() {
        return Err(AppError::InvalidInput("message must not be empty".to_string()));
    }

    let reply = state.agent.execute(&payload.message).await?;
    Ok(Json(ChatResponse { reply }))
}
