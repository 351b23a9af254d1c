//! Request-level error taxonomy and its HTTP mapping.

use crate::services::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// No credential: rejected before any model call.
    #[error("API key not configured")]
    Configuration,

    /// Caller input missing or malformed: rejected before any model call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model replied but its output could not be parsed.
    #[error("Failed to parse model response: {reason}")]
    Extraction { raw: String, reason: String },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Provider(ProviderError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Provider(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Extraction { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

/// Error body shared by every API endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ServiceError::Extraction { raw, .. } => ErrorBody {
                status: "error",
                message: "Failed to parse model response".to_string(),
                raw_response: Some(raw),
            },
            other => ErrorBody {
                status: "error",
                message: other.to_string(),
                raw_response: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
