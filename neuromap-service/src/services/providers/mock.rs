//! Scripted provider for tests and offline runs.

use super::{ContentProvider, ModelReply, Prompt, ProviderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued replies, then falls back to a fixed reply. Records every prompt.
pub struct MockProvider {
    queued: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: Result<String, ProviderError>,
    prompts: Mutex<Vec<Prompt>>,
}

impl MockProvider {
    /// Always replies with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_fallback(Ok(text.into()))
    }

    /// Always fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: Result<String, ProviderError>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-off reply served before the fallback.
    pub fn then(self, reply: Result<String, ProviderError>) -> Self {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    fn model(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<ModelReply, ProviderError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.clone());

        let next = self
            .queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        next.unwrap_or_else(|| self.fallback.clone())
            .map(ModelReply::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_queued_replies_before_fallback() {
        let provider = MockProvider::replying("fallback").then(Err(ProviderError::RateLimited));

        let first = provider.generate(&Prompt::text("one")).await;
        let second = provider.generate(&Prompt::text("two")).await;

        assert_eq!(first, Err(ProviderError::RateLimited));
        assert_eq!(second.unwrap().text(), "fallback");
        assert_eq!(provider.calls(), 2);
        assert_eq!(provider.last_prompt(), Some(Prompt::text("two")));
    }
}
