//! Multiple-choice quiz generation.
//!
//! Decoded quizzes are passed through as-is: items are not checked against
//! [`QuizItem`], and `answer` is not checked against `options`.

use super::{call_model, extract_reply, ContentProvider, Generation, Prompt, ProviderError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const USE_CASE: &str = "quiz";

pub const DEFAULT_ORGAN: &str = "heart";
pub const DEFAULT_COUNT: u32 = 10;
/// Counts offered to interactive users.
pub const PREFERRED_COUNTS: [u32; 3] = [5, 10, 20];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive parse; anything unrecognized becomes `Medium`.
    pub fn coerce(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            other => {
                tracing::debug!(difficulty = other, "Unknown difficulty, using medium");
                Difficulty::Medium
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snap a count to the preferred set, falling back to [`DEFAULT_COUNT`].
pub fn preferred_count(count: u32) -> u32 {
    if PREFERRED_COUNTS.contains(&count) {
        count
    } else {
        DEFAULT_COUNT
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub organ: String,
    pub difficulty: Difficulty,
    pub count: u32,
}

impl QuizRequest {
    /// Blank organs fall back to [`DEFAULT_ORGAN`]; difficulty is coerced.
    pub fn new(organ: &str, difficulty: &str, count: u32) -> Self {
        let organ = organ.trim();
        Self {
            organ: if organ.is_empty() {
                DEFAULT_ORGAN.to_string()
            } else {
                organ.to_string()
            },
            difficulty: Difficulty::coerce(difficulty),
            count,
        }
    }
}

/// Expected shape of one generated question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
}

pub fn build_prompt(request: &QuizRequest) -> Prompt {
    Prompt::text(format!(
        r#"You are an expert anatomy teacher.
Generate a multiple-choice quiz of {count} questions about the **{organ}**.
Difficulty level: {difficulty}.
Focus on its structure, parts, and functions.

Format your response strictly as JSON:
[
    {{
        "question": "Question text",
        "options": ["A", "B", "C", "D"],
        "answer": "Correct option letter",
        "explanation": "One-line explanation of the answer"
    }},
    ...
]"#,
        count = request.count,
        organ = request.organ,
        difficulty = request.difficulty,
    ))
}

/// Generate a quiz. `Degraded` carries the raw reply when it is not JSON.
#[tracing::instrument(skip(provider), fields(organ = %request.organ, difficulty = %request.difficulty, count = request.count))]
pub async fn generate(
    provider: &dyn ContentProvider,
    request: &QuizRequest,
) -> Result<Generation<Value>, ProviderError> {
    let reply = call_model(USE_CASE, provider, &build_prompt(request)).await?;
    Ok(extract_reply(USE_CASE, &reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockProvider;
    use serde_json::json;

    #[test]
    fn unknown_difficulty_is_coerced_to_medium() {
        assert_eq!(Difficulty::coerce("extreme"), Difficulty::Medium);
        assert_eq!(Difficulty::coerce(""), Difficulty::Medium);
        assert_eq!(Difficulty::coerce(" HARD "), Difficulty::Hard);
        assert_eq!(Difficulty::coerce("easy"), Difficulty::Easy);
    }

    #[test]
    fn extreme_difficulty_reaches_the_prompt_as_medium() {
        let request = QuizRequest::new("lungs", "extreme", 5);
        let text = build_prompt(&request).text_content();

        assert!(text.contains("Difficulty level: medium."));
        assert!(text.contains("quiz of 5 questions about the **lungs**"));
        assert!(!text.contains("extreme"));
    }

    #[test]
    fn blank_organ_defaults_to_heart() {
        assert_eq!(QuizRequest::new("  ", "easy", 10).organ, "heart");
    }

    #[test]
    fn counts_snap_to_preferred_set() {
        assert_eq!(preferred_count(5), 5);
        assert_eq!(preferred_count(20), 20);
        assert_eq!(preferred_count(7), DEFAULT_COUNT);
        assert_eq!(preferred_count(0), DEFAULT_COUNT);
    }

    #[tokio::test]
    async fn fenced_quiz_is_passed_through_without_item_checks() {
        // The answer is not one of the options; the use case does not care.
        let provider = MockProvider::replying(
            "Sure! ```json\n[{\"question\":\"Q\",\"options\":[\"A\",\"B\",\"C\",\"D\"],\"answer\":\"Z\",\"explanation\":\"E\",\"extra\":1}]\n```",
        );

        let generation = generate(&provider, &QuizRequest::new("heart", "hard", 1))
            .await
            .unwrap();

        assert_eq!(
            generation,
            Generation::Succeeded(json!([{
                "question": "Q",
                "options": ["A", "B", "C", "D"],
                "answer": "Z",
                "explanation": "E",
                "extra": 1
            }]))
        );
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn non_json_reply_degrades() {
        let provider = MockProvider::replying("I cannot provide that.");
        let generation = generate(&provider, &QuizRequest::new("heart", "medium", 10))
            .await
            .unwrap();

        assert!(
            matches!(generation, Generation::Degraded { ref raw, .. } if raw == "I cannot provide that.")
        );
    }

    #[test]
    fn quiz_item_matches_wire_shape() {
        let item: QuizItem = serde_json::from_value(json!({
            "question": "Which chamber pumps blood to the body?",
            "options": ["A) Left ventricle", "B) Right atrium", "C) Left atrium", "D) Right ventricle"],
            "answer": "A",
            "explanation": "The left ventricle feeds the aorta."
        }))
        .unwrap();
        assert_eq!(item.options.len(), 4);
    }
}
