use super::json_body;
use crate::error::ServiceError;
use crate::services::quiz::{self, QuizRequest, DEFAULT_COUNT, DEFAULT_ORGAN};
use crate::startup::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct QuizRequestBody {
    /// Non-string values fall back to the default organ.
    #[serde(default, deserialize_with = "lenient_string")]
    pub organ: Option<String>,
    /// Non-string values are coerced to medium like any unknown level.
    #[serde(default, deserialize_with = "lenient_string")]
    pub difficulty: Option<String>,
    #[serde(default = "default_count", alias = "count")]
    #[validate(range(min = 1, max = 50, message = "num_questions must be between 1 and 50"))]
    pub num_questions: u32,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub status: &'static str,
    pub quiz: Value,
}

#[tracing::instrument(skip(state, payload))]
pub async fn generate_quiz(
    State(state): State<AppState>,
    payload: Result<Json<QuizRequestBody>, JsonRejection>,
) -> Result<Json<QuizResponse>, ServiceError> {
    let provider = state.text_provider()?;
    let body = json_body(payload)?;
    body.validate()?;

    let request = QuizRequest::new(
        body.organ.as_deref().unwrap_or(DEFAULT_ORGAN),
        body.difficulty.as_deref().unwrap_or_default(),
        body.num_questions,
    );
    let quiz = quiz::generate(provider.as_ref(), &request)
        .await?
        .into_result()?;

    Ok(Json(QuizResponse {
        status: "success",
        quiz,
    }))
}
