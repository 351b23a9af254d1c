use super::json_body;
use crate::error::ServiceError;
use crate::services::chat;
use crate::startup::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    pub response: String,
}

#[tracing::instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServiceError> {
    let provider = state.text_provider()?;
    let request = json_body(payload)?;
    let message = request.message.unwrap_or_default();

    let answer = chat::answer(provider.as_ref(), &message).await?;

    Ok(Json(ChatResponse {
        status: "success",
        response: answer,
    }))
}
