//! Response mode value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// How assistant text reaches the conversation log
///
/// - `SingleShot`: wait for the full answer, then replace the placeholder
/// - `Streaming`: append each chunk to the placeholder as it arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseMode {
    #[serde(rename = "single", alias = "single-shot")]
    SingleShot,
    #[default]
    #[serde(rename = "stream", alias = "streaming")]
    Streaming,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::SingleShot => "single",
            ResponseMode::Streaming => "stream",
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, ResponseMode::Streaming)
    }
}

impl std::fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResponseMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" | "single-shot" | "singleshot" => Ok(ResponseMode::SingleShot),
            "stream" | "streaming" => Ok(ResponseMode::Streaming),
            other => Err(DomainError::InvalidResponseMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_streaming() {
        assert_eq!(ResponseMode::default(), ResponseMode::Streaming);
        assert!(ResponseMode::default().is_streaming());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("single".parse(), Ok(ResponseMode::SingleShot));
        assert_eq!("Single-Shot".parse(), Ok(ResponseMode::SingleShot));
        assert_eq!(" streaming ".parse(), Ok(ResponseMode::Streaming));
        assert_eq!(
            "burst".parse::<ResponseMode>(),
            Err(DomainError::InvalidResponseMode("burst".to_string()))
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ResponseMode::SingleShot).unwrap();
        assert_eq!(json, "\"single\"");
        let mode: ResponseMode = serde_json::from_str("\"streaming\"").unwrap();
        assert_eq!(mode, ResponseMode::Streaming);
    }
}
