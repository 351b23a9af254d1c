//! Multi-view anatomical labeling.
//!
//! Four photographs of an organ go to the vision model in one prompt; the
//! reply is expected to be a JSON array of [`LabelItem`]s with normalized 3D
//! positions. Items are checked loosely: non-conforming elements are counted
//! and logged but kept verbatim.

use super::{call_model, extract_reply, ContentProvider, Generation, Prompt, ProviderError};
use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

const USE_CASE: &str = "labeling";

pub const VIEW_COUNT: usize = 4;
pub const DEFAULT_ORGAN: &str = "kidney";
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
pub const RAW_RESPONSE_FILE: &str = "raw_response.txt";

/// One photograph of the organ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageView {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Result<Self, ServiceError> {
        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(ServiceError::validation(format!(
                "Unsupported media type '{}': views must be images",
                mime_type
            )));
        }
        if data.is_empty() {
            return Err(ServiceError::validation("Image view is empty"));
        }
        Ok(Self { mime_type, data })
    }

    /// Read an image from disk, guessing its media type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ServiceError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            ServiceError::validation(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .filter(|m| m.starts_with("image/"))
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());

        Self::new(mime_type, data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRequest {
    pub organ: String,
    pub views: [ImageView; VIEW_COUNT],
}

impl LabelRequest {
    /// Exactly [`VIEW_COUNT`] views are required.
    pub fn new(organ: &str, views: Vec<ImageView>) -> Result<Self, ServiceError> {
        let count = views.len();
        let views: [ImageView; VIEW_COUNT] = views.try_into().map_err(|_| {
            ServiceError::validation(format!(
                "Expected {} image views, got {}",
                VIEW_COUNT, count
            ))
        })?;

        let organ = organ.trim();
        Ok(Self {
            organ: if organ.is_empty() {
                DEFAULT_ORGAN.to_string()
            } else {
                organ.to_string()
            },
            views,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn is_normalized(&self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .all(|c| (-1.0..=1.0).contains(c))
    }
}

/// Expected shape of one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelItem {
    pub name: String,
    pub short_description: String,
    pub position: Position,
}

impl LabelItem {
    fn conforms(value: &Value) -> bool {
        serde_json::from_value::<LabelItem>(value.clone())
            .map(|item| item.position.is_normalized())
            .unwrap_or(false)
    }
}

/// Labels as returned by the model, plus how many matched [`LabelItem`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSet {
    pub items: Vec<Value>,
    pub conforming: usize,
}

impl LabelSet {
    fn from_items(items: Vec<Value>) -> Self {
        let conforming = items.iter().filter(|v| LabelItem::conforms(v)).count();
        Self { items, conforming }
    }
}

pub fn instruction(organ: &str) -> String {
    format!(
        r#"You are an expert in human anatomy and 3D reasoning.
The following images show a human {organ} from multiple angles (front, back, top, bottom).

Identify and label key anatomical structures visible in these images.

Return ONLY a JSON array, where each item contains:
- name: Name of the {organ} part
- short_description: 1-2 line explanation
- position: approximate 3D position (x, y, z) normalized between -1 and 1, assuming the {organ} is centered.

Example:
[
  {{
    "name": "Renal Cortex",
    "short_description": "Outer layer of the kidney containing the filtering units.",
    "position": {{ "x": 0.3, "y": 0.2, "z": 0.1 }}
  }}
]"#
    )
}

/// Instruction first, then the views in order.
pub fn build_prompt(request: &LabelRequest) -> Prompt {
    request
        .views
        .iter()
        .fold(
            Prompt::builder().text(instruction(&request.organ)),
            |builder, view| builder.image(view.mime_type.clone(), view.data.clone()),
        )
        .build()
}

fn shape(value: Value, raw: String) -> Generation<LabelSet> {
    match value {
        Value::Array(items) => Generation::Succeeded(LabelSet::from_items(items)),
        object @ Value::Object(_) => Generation::Succeeded(LabelSet::from_items(vec![object])),
        _ => Generation::Degraded {
            raw,
            reason: "expected a JSON array of labels".to_string(),
        },
    }
}

/// Label the organ shown in `request`.
#[tracing::instrument(skip(provider, request), fields(organ = %request.organ))]
pub async fn label(
    provider: &dyn ContentProvider,
    request: &LabelRequest,
) -> Result<Generation<LabelSet>, ProviderError> {
    let reply = call_model(USE_CASE, provider, &build_prompt(request)).await?;

    let generation = match extract_reply(USE_CASE, &reply) {
        Generation::Succeeded(value) => shape(value, reply.into_text()),
        Generation::Degraded { raw, reason } => Generation::Degraded { raw, reason },
    };

    if let Generation::Succeeded(set) = &generation {
        let loose = set.items.len() - set.conforming;
        if loose > 0 {
            tracing::warn!(
                total = set.items.len(),
                non_conforming = loose,
                "Some labels do not match the expected shape"
            );
        }
    }

    Ok(generation)
}

/// File name for a structured result, e.g. `kidney_labels.json`.
pub fn labels_file_name(organ: &str) -> String {
    let slug: String = organ
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = if slug.is_empty() {
        DEFAULT_ORGAN.to_string()
    } else {
        slug
    };
    format!("{}_labels.json", slug)
}

/// Write one file for the outcome and return its path: pretty JSON labels on
/// success, the raw reply on degradation.
pub async fn persist_outcome(
    dir: &Path,
    organ: &str,
    outcome: &Generation<LabelSet>,
) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let (path, contents) = match outcome {
        Generation::Succeeded(set) => (
            dir.join(labels_file_name(organ)),
            serde_json::to_vec_pretty(&set.items).map_err(std::io::Error::other)?,
        ),
        Generation::Degraded { raw, .. } => (dir.join(RAW_RESPONSE_FILE), raw.as_bytes().to_vec()),
    };

    tokio::fs::write(&path, contents).await?;
    tracing::info!(path = %path.display(), degraded = outcome.is_degraded(), "Saved labeling result");

    Ok(path)
}
