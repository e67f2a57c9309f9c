//! Chat configuration from TOML (`[chat]` section)

use cnxh_domain::{DomainError, ResponseMode};
use serde::{Deserialize, Serialize};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// "stream" or "single"; kept as a string so a typo is reported by
    /// validation instead of failing the whole load
    pub response_mode: String,
    /// Open the conversation with the assistant's greeting
    pub greeting: bool,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            response_mode: ResponseMode::default().as_str().to_string(),
            greeting: true,
        }
    }
}

impl FileChatConfig {
    pub fn parse_response_mode(&self) -> Result<ResponseMode, DomainError> {
        self.response_mode.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_streaming() {
        let config = FileChatConfig::default();
        assert_eq!(config.parse_response_mode(), Ok(ResponseMode::Streaming));
        assert!(config.greeting);
    }

    #[test]
    fn test_parse_single() {
        let config = FileChatConfig {
            response_mode: "single".to_string(),
            greeting: false,
        };
        assert_eq!(config.parse_response_mode(), Ok(ResponseMode::SingleShot));
    }

    #[test]
    fn test_parse_invalid() {
        let config = FileChatConfig {
            response_mode: "batch".to_string(),
            ..FileChatConfig::default()
        };
        assert!(config.parse_response_mode().is_err());
    }
}
