//! Error types for the Gemini adapter

use cnxh_application::ports::llm_gateway::GatewayError;
use thiserror::Error;

/// Result type alias for Gemini operations
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Errors that can occur when talking to the Gemini REST API
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("No API key found in {0}")]
    MissingApiKey(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {error}\nRaw response: {raw}")]
    ParseError { error: String, raw: String },

    #[error("Gemini returned no text in the response candidates")]
    EmptyResponse,

    #[error("Request timeout")]
    Timeout,
}

impl From<GeminiError> for GatewayError {
    fn from(error: GeminiError) -> Self {
        match error {
            GeminiError::MissingApiKey(sources) => GatewayError::MissingCredential(sources),
            GeminiError::Http(e) if e.is_timeout() => GatewayError::Timeout,
            GeminiError::Http(e) if e.is_connect() => GatewayError::ConnectionError(e.to_string()),
            GeminiError::Http(e) => GatewayError::RequestFailed(e.to_string()),
            GeminiError::Api { status: 404, message } => GatewayError::ModelNotAvailable(message),
            e @ GeminiError::Api { .. } => GatewayError::RequestFailed(e.to_string()),
            e @ (GeminiError::ParseError { .. } | GeminiError::EmptyResponse) => {
                GatewayError::MalformedResponse(e.to_string())
            }
            GeminiError::Timeout => GatewayError::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnxh_application::FailureCategory;

    #[test]
    fn test_gateway_error_mapping() {
        let missing: GatewayError = GeminiError::MissingApiKey("GEMINI_API_KEY".into()).into();
        assert_eq!(missing.category(), FailureCategory::Configuration);

        let api: GatewayError = GeminiError::Api {
            status: 500,
            message: "INTERNAL: boom".into(),
        }
        .into();
        assert!(matches!(api, GatewayError::RequestFailed(msg) if msg.contains("HTTP 500")));

        let not_found: GatewayError = GeminiError::Api {
            status: 404,
            message: "models/nope is not found".into(),
        }
        .into();
        assert!(matches!(not_found, GatewayError::ModelNotAvailable(_)));

        let empty: GatewayError = GeminiError::EmptyResponse.into();
        assert_eq!(empty.category(), FailureCategory::MalformedResponse);

        let timeout: GatewayError = GeminiError::Timeout.into();
        assert!(matches!(timeout, GatewayError::Timeout));
    }
}
