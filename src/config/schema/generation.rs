use serde::{Deserialize, Serialize};

use crate::generation::DEFAULT_ARTIFACT_TIMEOUT;

/// Which document generator the gateway runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GenerationBackend {
    /// Deterministic templates rendered from form fields; no network.
    #[default]
    Template,
    /// OpenAI-compatible chat completions endpoint.
    Llm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub backend: GenerationBackend,
    /// Provider label used in logs and error messages
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Deadline for one artifact; must stay below `gateway.request_timeout_secs`
    #[serde(default = "default_artifact_timeout_secs")]
    pub artifact_timeout_secs: u64,
}

fn default_provider() -> String {
    "openai".into()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_artifact_timeout_secs() -> u64 {
    DEFAULT_ARTIFACT_TIMEOUT.as_secs()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::default(),
            provider: default_provider(),
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            artifact_timeout_secs: default_artifact_timeout_secs(),
        }
    }
}
