//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers.

use async_trait::async_trait;
use cnxh_domain::{Model, StreamEvent};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Missing credential: none of {0} is set")]
    MissingCredential(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Coarse grouping of [`GatewayError`]s used to pick the user-facing text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// The client cannot be constructed (no credential). Retrying won't help
    /// until the environment changes.
    Configuration,
    /// Network, HTTP or timeout failure
    Transport,
    /// The service answered, but not with anything usable
    MalformedResponse,
}

impl GatewayError {
    pub fn category(&self) -> FailureCategory {
        match self {
            GatewayError::MissingCredential(_) => FailureCategory::Configuration,
            GatewayError::MalformedResponse(_) => FailureCategory::MalformedResponse,
            _ => FailureCategory::Transport,
        }
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Create a new chat session bound to a model and a system instruction.
    ///
    /// Fails with [`GatewayError::MissingCredential`] when the adapter has no
    /// credential to authenticate with.
    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// Handle for receiving streaming events from an LLM session.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The stream ends when the producer
/// drops its sender; a failure event ([`StreamEvent::Error`] or
/// [`StreamEvent::Malformed`]) is always the last one.
/// Cancelling the handle signals the producer through a shared
/// [`CancellationToken`] and stops yielding buffered events.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self::with_cancellation(receiver, CancellationToken::new())
    }

    /// Create a handle whose producer watches `cancel`
    pub fn with_cancellation(
        receiver: mpsc::Receiver<StreamEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self { receiver, cancel }
    }

    /// Receive the next event, or `None` once the stream ended or was cancelled
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            event = self.receiver.recv() => event,
        }
    }

    /// Stop the stream. The producer observes the token and stops reading
    /// from the network.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Stream for StreamHandle {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        this.receiver.poll_recv(cx)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        // Nobody is listening any more; let the producer stop early.
        self.cancel.cancel();
    }
}

/// An active LLM session
///
/// A session carries the conversation context on the provider side, so
/// successive turns see earlier ones.
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Get the model used by this session
    fn model(&self) -> &Model;

    /// Send a message and get the complete response
    async fn send(&self, content: &str) -> Result<String, GatewayError>;

    /// Send a message and get a streaming response.
    ///
    /// Default implementation calls `send()` and yields the whole answer as a
    /// single `Delta`, so adapters without streaming still work.
    async fn send_streaming(&self, content: &str) -> Result<StreamHandle, GatewayError> {
        let result = self.send(content).await?;
        let (tx, rx) = mpsc::channel(1);
        // Buffer of one; the receiver is still ours, so this cannot fail
        let _ = tx.send(StreamEvent::Delta(result)).await;
        Ok(StreamHandle::new(rx))
    }
}
