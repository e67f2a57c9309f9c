//! Gemini chat session.
//!
//! The REST API is stateless, so [`GeminiSession`] keeps the conversation
//! history itself and replays it with every request. A turn (the user's
//! message plus the model's answer) is committed to the history only after
//! the answer arrived completely; failed or cancelled turns leave no trace.
//!
//! The history lock is held for the whole turn, so concurrent turns on one
//! session are answered one after the other.

use crate::gemini::error::{GeminiError, Result};
use crate::gemini::gateway::{ApiKey, GeminiOptions};
use crate::gemini::protocol::{
    Content, ErrorWrapper, GenerateContentRequest, GenerateContentResponse, api_error_message,
};
use crate::gemini::sse::SseDecoder;
use async_trait::async_trait;
use cnxh_application::ports::llm_gateway::{GatewayError, LlmSession, StreamHandle};
use cnxh_domain::{Model, StreamEvent, truncate};
use futures::StreamExt;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Chunks buffered between the reader task and the consumer
const STREAM_BUFFER: usize = 64;

/// A conversation with one Gemini model under one system instruction
pub struct GeminiSession {
    client: Client,
    options: Arc<GeminiOptions>,
    api_key: ApiKey,
    model: Model,
    system_instruction: Content,
    history: Arc<Mutex<Vec<Content>>>,
}

impl GeminiSession {
    pub(crate) fn new(
        client: Client,
        options: Arc<GeminiOptions>,
        api_key: ApiKey,
        model: Model,
        system_instruction: &str,
    ) -> Self {
        debug!("Creating Gemini session with model: {}", model);
        Self {
            client,
            options,
            api_key,
            model,
            system_instruction: Content::instruction(system_instruction),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of committed contents (two per completed turn)
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.options.base_url.trim_end_matches('/'),
            self.model,
            method
        )
    }

    fn request_for(&self, history: &[Content], user: &Content) -> GenerateContentRequest {
        let mut contents = history.to_vec();
        contents.push(user.clone());
        GenerateContentRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            generation_config: self.options.generation.clone().non_empty(),
        }
    }

    /// Send one turn and wait for the complete answer
    pub async fn ask(&self, content: &str) -> Result<String> {
        let mut history = self.history.lock().await;
        let user = Content::user(content);
        let request = self.request_for(&history, &user);

        debug!(
            "generateContent ({} contents): {}",
            request.contents.len(),
            truncate(content, 80)
        );

        let response = self
            .client
            .post(self.url("generateContent"))
            .header(API_KEY_HEADER, self.api_key.expose())
            .timeout(self.options.request_timeout)
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let raw = response.text().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|e| GeminiError::ParseError {
                error: e.to_string(),
                raw: truncate(&raw, 500),
            })?;

        let answer = match parsed.text().filter(|text| !text.is_empty()) {
            Some(answer) => answer,
            None => {
                if let Some(reason) = parsed.block_reason() {
                    warn!("Prompt blocked by Gemini: {}", reason);
                }
                return Err(GeminiError::EmptyResponse);
            }
        };

        history.push(user);
        history.push(Content::model(answer.clone()));
        Ok(answer)
    }

    /// Send one turn and stream the answer.
    ///
    /// Errors up to and including the response status are returned directly;
    /// later failures arrive as a final [`StreamEvent::Error`], or
    /// [`StreamEvent::Malformed`] when the answer had no usable content.
    pub async fn ask_streaming(&self, content: &str) -> Result<StreamHandle> {
        let history = Arc::clone(&self.history).lock_owned().await;
        let user = Content::user(content);
        let request = self.request_for(&history, &user);

        debug!(
            "streamGenerateContent ({} contents): {}",
            request.contents.len(),
            truncate(content, 80)
        );

        let pending = self
            .client
            .post(format!("{}?alt=sse", self.url("streamGenerateContent")))
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send();
        let response = tokio::time::timeout(self.options.request_timeout, pending)
            .await
            .map_err(|_| GeminiError::Timeout)??;
        let response = check_status(response).await?;

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let cancel = CancellationToken::new();
        let idle_timeout = self.options.stream_idle_timeout;

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut history = history;
            let outcome = tokio::select! {
                biased;
                () = task_cancel.cancelled() => None,
                result = forward_events(response, &tx, idle_timeout) => Some(result),
            };

            match outcome {
                None | Some(Ok(None)) => debug!("Gemini stream stopped by the consumer"),
                Some(Ok(Some(answer))) => {
                    debug!("Gemini stream finished ({} bytes)", answer.len());
                    history.push(user);
                    history.push(Content::model(answer));
                }
                Some(Err(e)) => {
                    warn!("Gemini stream failed: {}", e);
                    let event = match GatewayError::from(e) {
                        GatewayError::MalformedResponse(message) => StreamEvent::Malformed(message),
                        other => StreamEvent::Error(other.to_string()),
                    };
                    let _ = tx.send(event).await;
                }
            }
        });

        Ok(StreamHandle::with_cancellation(rx, cancel))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err(GeminiError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

/// Read SSE events from `response` and forward their text as deltas.
///
/// Returns the full answer, or `None` when the receiver went away.
async fn forward_events(
    response: Response,
    tx: &mpsc::Sender<StreamEvent>,
    idle_timeout: Duration,
) -> Result<Option<String>> {
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut answer = String::new();

    loop {
        let (payloads, done) = match tokio::time::timeout(idle_timeout, body.next()).await {
            Err(_) => return Err(GeminiError::Timeout),
            Ok(Some(chunk)) => (decoder.push(&chunk?), false),
            Ok(None) => (decoder.finish().into_iter().collect(), true),
        };

        for payload in payloads {
            let Some(text) = parse_event(&payload)? else {
                continue;
            };
            answer.push_str(&text);
            if tx.send(StreamEvent::Delta(text)).await.is_err() {
                return Ok(None);
            }
        }

        if done {
            break;
        }
    }

    if answer.is_empty() {
        return Err(GeminiError::EmptyResponse);
    }
    Ok(Some(answer))
}

/// Text carried by one SSE event; an error payload fails the stream
fn parse_event(payload: &str) -> Result<Option<String>> {
    if let Ok(wrapper) = serde_json::from_str::<ErrorWrapper>(payload) {
        let status = wrapper
            .error
            .code
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(500);
        return Err(GeminiError::Api {
            status,
            message: api_error_message(payload),
        });
    }

    let event: GenerateContentResponse =
        serde_json::from_str(payload).map_err(|e| GeminiError::ParseError {
            error: e.to_string(),
            raw: truncate(payload, 500),
        })?;
    Ok(event.text().filter(|text| !text.is_empty()))
}

#[async_trait]
impl LlmSession for GeminiSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> std::result::Result<String, GatewayError> {
        self.ask(content).await.map_err(GatewayError::from)
    }

    async fn send_streaming(
        &self,
        content: &str,
    ) -> std::result::Result<StreamHandle, GatewayError> {
        self.ask_streaming(content).await.map_err(GatewayError::from)
    }
}
