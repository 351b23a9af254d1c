use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::providers::gemini::GEMINI_API_BASE;

const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone)]
pub struct NeuromapConfig {
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub google: GoogleConfig,
    pub labeling: LabelingConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model for chat and quiz generation
    pub text_model: String,
    /// Model for multi-image labeling
    pub vision_model: String,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Absent credentials are allowed at startup; model-backed routes then
    /// answer with a configuration error.
    pub api_key: Option<Secret<String>>,
    pub api_base: String,
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct LabelingConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub otlp_endpoint: Option<String>,
}

impl NeuromapConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup: &lookup };
        let is_prod = vars.optional("ENVIRONMENT").as_deref() == Some("prod");

        let api_key = vars
            .optional("GEMINI_API_KEY")
            .or_else(|| vars.optional("GOOGLE_API_KEY"))
            .map(Secret::new);

        let request_timeout = vars
            .optional("GENAI_REQUEST_TIMEOUT_SECS")
            .map(|secs| {
                secs.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "GENAI_REQUEST_TIMEOUT_SECS must be a whole number of seconds: {}",
                        e
                    ))
                })
            })
            .transpose()?;

        Ok(NeuromapConfig {
            common,
            models: ModelConfig {
                text_model: vars.get("GENAI_TEXT_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                vision_model: vars.get("GENAI_VISION_MODEL", Some(DEFAULT_MODEL), is_prod)?,
            },
            google: GoogleConfig {
                api_key,
                api_base: vars
                    .optional("GEMINI_API_BASE")
                    .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
                request_timeout,
            },
            labeling: LabelingConfig {
                output_dir: vars
                    .get("LABELING_OUTPUT_DIR", Some(DEFAULT_OUTPUT_DIR), is_prod)?
                    .into(),
            },
            observability: ObservabilityConfig {
                otlp_endpoint: vars.optional("OTLP_ENDPOINT"),
            },
        })
    }
}

struct Vars<'a, F> {
    lookup: &'a F,
}

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Set and non-blank.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn get(&self, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
        match self.optional(key) {
            Some(val) => Ok(val),
            None => {
                if is_prod {
                    Err(AppError::ConfigError(anyhow::anyhow!(
                        "{} is required in production but not set",
                        key
                    )))
                } else if let Some(def) = default {
                    Ok(def.to_string())
                } else {
                    Err(AppError::ConfigError(anyhow::anyhow!(
                        "{} is required but not set",
                        key
                    )))
                }
            }
        }
    }
}
