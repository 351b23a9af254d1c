//! HTTP handlers for the NeuroMap service.
//!
//! Each handler resolves the model client first (configuration errors), then
//! validates input, then delegates to the matching use case in `services`.

pub mod chat;
pub mod health;
pub mod label;
pub mod quiz;

pub use chat::chat;
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use label::label_organ;
pub use quiz::generate_quiz;

use crate::error::ServiceError;
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Turn axum's JSON rejection into our error body.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServiceError::validation(rejection.body_text()))
}
