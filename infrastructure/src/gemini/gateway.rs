//! Gemini LLM Gateway implementation

use crate::gemini::error::GeminiError;
use crate::gemini::protocol::GenerationConfig;
use crate::gemini::session::GeminiSession;
use async_trait::async_trait;
use cnxh_application::ports::credentials::CredentialSource;
use cnxh_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use cnxh_domain::Model;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Public Gemini REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection and sampling options shared by every session of a gateway
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    pub base_url: String,
    /// Upper bound for a single-shot request, and for receiving the response
    /// headers of a streamed one
    pub request_timeout: Duration,
    /// Longest allowed silence between two chunks of a streamed response
    pub stream_idle_timeout: Duration,
    pub generation: GenerationConfig,
}

impl Default for GeminiOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            stream_idle_timeout: Duration::from_secs(30),
            generation: GenerationConfig::default(),
        }
    }
}

/// API key that never shows up in `Debug` output or logs
#[derive(Clone)]
pub(crate) struct ApiKey(pub(crate) String);

impl ApiKey {
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// LLM Gateway implementation for the Google Gemini REST API
pub struct GeminiLlmGateway {
    client: Client,
    credentials: Arc<dyn CredentialSource>,
    options: Arc<GeminiOptions>,
}

impl GeminiLlmGateway {
    pub fn new(credentials: Arc<dyn CredentialSource>, options: GeminiOptions) -> Self {
        Self::with_client(Client::new(), credentials, options)
    }

    /// Create a gateway with an existing HTTP client
    pub fn with_client(
        client: Client,
        credentials: Arc<dyn CredentialSource>,
        options: GeminiOptions,
    ) -> Self {
        info!("GeminiLlmGateway initialized ({})", options.base_url);
        Self {
            client,
            credentials,
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &GeminiOptions {
        &self.options
    }

    fn api_key(&self) -> Result<ApiKey, GeminiError> {
        self.credentials
            .api_key()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(ApiKey)
            .ok_or_else(|| GeminiError::MissingApiKey(self.credentials.describe()))
    }
}

#[async_trait]
impl LlmGateway for GeminiLlmGateway {
    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        let api_key = self.api_key()?;
        let session = GeminiSession::new(
            self.client.clone(),
            Arc::clone(&self.options),
            api_key,
            model.clone(),
            system_prompt,
        );
        Ok(Box::new(session))
    }
}
