//! Recovers JSON payloads from free-form model replies.
//!
//! Models often wrap JSON in a markdown code fence, sometimes with a language
//! tag and surrounding prose. Extraction takes the first fenced segment (or the
//! whole text when there is no fence), drops a bare language tag line, trims,
//! and decodes strictly. It is pure and deterministic.

use serde_json::Value;

/// Markdown code fence delimiter.
pub const FENCE: &str = "```";

const MAX_LANGUAGE_TAG_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Structured(Value),
    /// `raw` is the untouched input, not the stripped candidate.
    Failed { raw: String, reason: String },
}

pub fn extract(raw: &str) -> Extraction {
    let candidate = match fenced_body(raw) {
        Some(body) => strip_language_tag(body),
        None => raw,
    };

    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value) => Extraction::Structured(value),
        Err(e) => Extraction::Failed {
            raw: raw.to_string(),
            reason: e.to_string(),
        },
    }
}

/// Text between the first and second fence. An unterminated fence yields
/// everything after it.
fn fenced_body(text: &str) -> Option<&str> {
    let mut segments = text.splitn(3, FENCE);
    segments.next();
    segments.next()
}

fn strip_language_tag(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first, rest)) if is_language_tag(first.trim()) => rest,
        _ => body,
    }
}

fn is_language_tag(line: &str) -> bool {
    let mut chars = line.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());

    starts_alpha
        && line.len() <= MAX_LANGUAGE_TAG_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '#' | '.'))
        && !matches!(line, "true" | "false" | "null")
}

/// First `max_chars` characters, for log lines.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
