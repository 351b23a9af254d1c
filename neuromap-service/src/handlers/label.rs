use super::json_body;
use crate::error::ServiceError;
use crate::services::labeling::{self, ImageView, LabelRequest, DEFAULT_ORGAN};
use crate::services::Generation;
use crate::startup::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LabelRequestBody {
    #[serde(default = "default_organ")]
    pub organ: String,
    #[validate(length(equal = 4, message = "exactly four views are required"))]
    pub views: Vec<ViewPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewPayload {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

fn default_organ() -> String {
    DEFAULT_ORGAN.to_string()
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LabelResponse {
    Success {
        labels: Vec<Value>,
        conforming: usize,
    },
    /// The model replied, but not with parseable labels.
    Degraded {
        message: &'static str,
        reason: String,
        raw_response: String,
    },
}

fn decode_views(views: Vec<ViewPayload>) -> Result<Vec<ImageView>, ServiceError> {
    views
        .into_iter()
        .enumerate()
        .map(|(i, view)| {
            let data = STANDARD.decode(view.data.trim()).map_err(|e| {
                ServiceError::validation(format!("View {} is not valid base64: {}", i + 1, e))
            })?;
            ImageView::new(view.mime_type, data)
        })
        .collect()
}

#[tracing::instrument(skip(state, payload))]
pub async fn label_organ(
    State(state): State<AppState>,
    payload: Result<Json<LabelRequestBody>, JsonRejection>,
) -> Result<Json<LabelResponse>, ServiceError> {
    let provider = state.vision_provider()?;
    let body = json_body(payload)?;
    body.validate()?;

    let request = LabelRequest::new(&body.organ, decode_views(body.views)?)?;

    let response = match labeling::label(provider.as_ref(), &request).await? {
        Generation::Succeeded(set) => LabelResponse::Success {
            labels: set.items,
            conforming: set.conforming,
        },
        Generation::Degraded { raw, reason } => LabelResponse::Degraded {
            message: "could not parse model response",
            reason,
            raw_response: raw,
        },
    };

    Ok(Json(response))
}
