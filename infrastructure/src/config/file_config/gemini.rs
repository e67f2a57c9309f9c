//! Gemini configuration from TOML (`[gemini]` section)

use crate::credentials::DEFAULT_API_KEY_VARS;
use crate::gemini::gateway::{DEFAULT_BASE_URL, GeminiOptions};
use crate::gemini::protocol::GenerationConfig;
use cnxh_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw Gemini configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Model name (e.g. "gemini-2.5-flash")
    pub model: String,
    /// Environment variables holding the API key, tried in order
    pub api_key_env: Vec<String>,
    /// REST endpoint root
    pub base_url: String,
    /// Timeout in seconds for a single-shot request
    pub timeout_seconds: u64,
    /// Longest silence in seconds between two streamed chunks
    pub stream_idle_timeout_seconds: u64,
    /// Sampling temperature (API default when unset)
    pub temperature: Option<f32>,
    /// Upper bound on answer length (API default when unset)
    pub max_output_tokens: Option<u32>,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            model: Model::default().to_string(),
            api_key_env: DEFAULT_API_KEY_VARS.iter().map(|s| s.to_string()).collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 60,
            stream_idle_timeout_seconds: 30,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl FileGeminiConfig {
    pub fn parse_model(&self) -> Model {
        let Ok(model) = self.model.parse::<Model>();
        model
    }

    pub fn to_options(&self) -> GeminiOptions {
        GeminiOptions {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.timeout_seconds),
            stream_idle_timeout: Duration::from_secs(self.stream_idle_timeout_seconds),
            generation: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}
