//! Open-domain anatomy Q&A. The reply is returned verbatim; no extraction.

use super::{call_model, ContentProvider, Prompt};
use crate::error::ServiceError;

pub const PERSONA: &str = "You are a helpful anatomy teacher. Give concise answers.";

const USE_CASE: &str = "chat";

pub fn build_prompt(question: &str) -> Prompt {
    Prompt::text(format!("{}\n\nQuestion: {}", PERSONA, question))
}

/// Answer `question`. Blank input is rejected without calling the model.
#[tracing::instrument(skip(provider, question), fields(question_len = question.len()))]
pub async fn answer(provider: &dyn ContentProvider, question: &str) -> Result<String, ServiceError> {
    if question.trim().is_empty() {
        return Err(ServiceError::validation("No message provided"));
    }

    let reply = call_model(USE_CASE, provider, &build_prompt(question)).await?;
    Ok(reply.into_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockProvider;
    use crate::services::ProviderError;

    #[tokio::test]
    async fn empty_message_is_rejected_without_a_model_call() {
        let provider = MockProvider::replying("unused");

        for message in ["", "   \n"] {
            let err = answer(&provider, message).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn reply_is_returned_unmodified() {
        let reply = "```json\n{\"not\": \"parsed\"}\n```";
        let provider = MockProvider::replying(reply);

        assert_eq!(answer(&provider, "What is the kidney?").await.unwrap(), reply);
    }

    #[tokio::test]
    async fn prompt_carries_persona_and_question_verbatim() {
        let provider = MockProvider::replying("Four.");
        answer(&provider, "  How many chambers does the heart have?")
            .await
            .unwrap();

        let prompt = provider.last_prompt().unwrap();
        assert_eq!(prompt.parts().len(), 1);
        assert_eq!(
            prompt.text_content(),
            "You are a helpful anatomy teacher. Give concise answers.\n\nQuestion:   How many chambers does the heart have?"
        );
    }

    #[tokio::test]
    async fn provider_failure_surfaces_directly() {
        let provider = MockProvider::failing(ProviderError::RateLimited);
        let err = answer(&provider, "hi").await.unwrap_err();
        assert!(matches!(err, ServiceError::Provider(ProviderError::RateLimited)));
        assert_eq!(provider.calls(), 1);
    }
}
