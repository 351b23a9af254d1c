//! Use cases: each assembles a prompt, calls the model once, and shapes the reply.

pub mod chat;
pub mod extractor;
pub mod labeling;
pub mod metrics;
pub mod providers;
pub mod quiz;

pub use extractor::{extract, Extraction};
pub use self::metrics::{get_metrics, init_metrics};
pub use providers::{ContentProvider, ModelReply, Prompt, ProviderError};

use crate::error::ServiceError;
use serde_json::Value;
use std::time::Instant;

const LOG_PREVIEW_CHARS: usize = 500;

/// Terminal state of a structured generation request.
///
/// Provider failures never reach this type; they short-circuit as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation<T> {
    Succeeded(T),
    /// The model replied but the reply could not be used as structured data.
    Degraded { raw: String, reason: String },
}

impl<T> Generation<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Generation::Degraded { .. })
    }

    /// Treat degradation as an error, for callers with no raw-text fallback.
    pub fn into_result(self) -> Result<T, ServiceError> {
        match self {
            Generation::Succeeded(value) => Ok(value),
            Generation::Degraded { raw, reason } => Err(ServiceError::Extraction { raw, reason }),
        }
    }
}

/// Single model call with timing, logging and metrics. Never retried.
pub(crate) async fn call_model(
    use_case: &'static str,
    provider: &dyn ContentProvider,
    prompt: &Prompt,
) -> Result<ModelReply, ProviderError> {
    tracing::debug!(
        use_case,
        model = provider.model(),
        parts = prompt.parts().len(),
        "Prompting model"
    );

    let start = Instant::now();
    let result = provider.generate(prompt).await;
    let elapsed = start.elapsed();

    match &result {
        Ok(reply) => {
            tracing::info!(
                use_case,
                model = provider.model(),
                reply_len = reply.text().len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Model replied"
            );
            metrics::record_model_call(use_case, "ok", elapsed);
        }
        Err(e) => {
            tracing::warn!(use_case, model = provider.model(), error = %e, "Model call failed");
            metrics::record_model_call(use_case, e.kind(), elapsed);
        }
    }

    result
}

/// Run the extractor over a reply and report the outcome.
pub(crate) fn extract_reply(use_case: &'static str, reply: &ModelReply) -> Generation<Value> {
    match extract(reply.text()) {
        Extraction::Structured(value) => {
            metrics::record_extraction(use_case, "structured");
            Generation::Succeeded(value)
        }
        Extraction::Failed { raw, reason } => {
            tracing::warn!(
                use_case,
                reason = %reason,
                preview = %extractor::preview(&raw, LOG_PREVIEW_CHARS),
                "Model reply is not valid JSON"
            );
            metrics::record_extraction(use_case, "failed");
            Generation::Degraded { raw, reason }
        }
    }
}
