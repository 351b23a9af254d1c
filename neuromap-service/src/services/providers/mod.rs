//! Model client abstractions and implementations.
//!
//! Every use case talks to the model through [`ContentProvider`], so the
//! Gemini client can be swapped for the scripted mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited by model provider")]
    RateLimited,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response from model provider: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Auth(_) => "auth",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::Transport(_) => "transport",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// One piece of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image { mime_type: String, data: Vec<u8> },
}

/// Ordered, immutable model input. Build with [`Prompt::builder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    parts: Vec<ContentPart>,
}

impl Prompt {
    pub fn builder() -> PromptBuilder {
        PromptBuilder::default()
    }

    /// Single text block prompt.
    pub fn text(text: impl Into<String>) -> Self {
        Self::builder().text(text).build()
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ContentPart::Image { .. }))
            .count()
    }

    /// Concatenated text blocks, images skipped.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Default)]
pub struct PromptBuilder {
    parts: Vec<ContentPart>,
}

impl PromptBuilder {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }

    pub fn image(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.parts.push(ContentPart::Image {
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    pub fn build(self) -> Prompt {
        Prompt { parts: self.parts }
    }
}

/// Raw text returned by the model. No structure is assumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    text: String,
}

impl ModelReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// A generative model that turns a prompt into text.
///
/// Implementations make exactly one upstream attempt per call.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &Prompt) -> Result<ModelReply, ProviderError>;
}
