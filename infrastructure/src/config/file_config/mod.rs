//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to adapter or domain types
//! on demand.

mod chat;
mod gemini;
mod output;
mod repl;

pub use chat::FileChatConfig;
pub use gemini::FileGeminiConfig;
pub use output::FileOutputConfig;
pub use repl::FileReplConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("gemini.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("gemini.stream_idle_timeout_seconds cannot be 0")]
    InvalidStreamIdleTimeout,

    #[error("gemini.model cannot be empty")]
    EmptyModelName,

    #[error("gemini.api_key_env must name at least one environment variable")]
    NoCredentialSource,

    #[error("chat.response_mode: unknown value '{0}' (expected \"stream\" or \"single\")")]
    InvalidResponseMode(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Gemini API settings
    pub gemini: FileGeminiConfig,
    /// Chat behaviour
    pub chat: FileChatConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the configuration, reporting the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.gemini.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.gemini.stream_idle_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidStreamIdleTimeout);
        }
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if !self
            .gemini
            .api_key_env
            .iter()
            .any(|var| !var.trim().is_empty())
        {
            return Err(ConfigValidationError::NoCredentialSource);
        }
        if self.chat.parse_response_mode().is_err() {
            return Err(ConfigValidationError::InvalidResponseMode(
                self.chat.response_mode.clone(),
            ));
        }
        Ok(())
    }
}
