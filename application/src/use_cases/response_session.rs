//! Response session use case.
//!
//! Owns at most one live [`LlmSession`] and creates it lazily on the first
//! request. Any failed request drops the cached session, so the next request
//! starts over with a fresh one bound to the same [`SessionSettings`].
//!
//! Two concurrent first requests may both create a session; the later write
//! wins and the other session is simply dropped.

use crate::config::SessionSettings;
use crate::ports::llm_gateway::{FailureCategory, GatewayError, LlmGateway, LlmSession, StreamHandle};
use cnxh_domain::{FallbackText, StreamEvent, truncate};
use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned by [`ResponseSession`] requests.
///
/// The `Display` output carries the technical cause for logs;
/// [`user_message`](ResponseError::user_message) is what the user sees.
#[derive(Error, Debug)]
pub enum ResponseError {
    /// No credential: nothing was created or cached
    #[error("Configuration error: {0}")]
    Configuration(#[source] GatewayError),

    /// Network, remote or malformed-response failure
    #[error("Transport error: {0}")]
    Transport(#[source] GatewayError),

    /// The stream failed after `delivered` chunks were already handed out
    #[error("Stream failed after {delivered} chunk(s): {source}")]
    PartialStream {
        delivered: usize,
        #[source]
        source: GatewayError,
    },
}

impl ResponseError {
    fn from_gateway(error: GatewayError) -> Self {
        match error.category() {
            FailureCategory::Configuration => ResponseError::Configuration(error),
            FailureCategory::Transport | FailureCategory::MalformedResponse => {
                ResponseError::Transport(error)
            }
        }
    }

    /// Localized text shown in place of an answer
    pub fn user_message(&self) -> &'static str {
        match self {
            ResponseError::Configuration(_) => FallbackText::configuration(),
            ResponseError::Transport(_) | ResponseError::PartialStream { .. } => {
                FallbackText::transport()
            }
        }
    }

    /// Whether resubmitting the same message can succeed without changing
    /// the environment
    pub fn is_retriable(&self) -> bool {
        !matches!(self, ResponseError::Configuration(_))
    }

    pub fn gateway_error(&self) -> &GatewayError {
        match self {
            ResponseError::Configuration(e) | ResponseError::Transport(e) => e,
            ResponseError::PartialStream { source, .. } => source,
        }
    }
}

type SessionSlot = Arc<Mutex<Option<Arc<dyn LlmSession>>>>;

fn lock_slot(slot: &SessionSlot) -> MutexGuard<'_, Option<Arc<dyn LlmSession>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn invalidate_slot(slot: &SessionSlot) {
    if lock_slot(slot).take().is_some() {
        info!("Chat session invalidated");
    }
}

/// Drop the cached session only if it is still `failed`; a newer session
/// created in the meantime stays.
fn invalidate_if_current(slot: &SessionSlot, failed: &Arc<dyn LlmSession>) {
    let mut cached = lock_slot(slot);
    if cached
        .as_ref()
        .is_some_and(|current| Arc::ptr_eq(current, failed))
    {
        *cached = None;
        info!("Chat session invalidated");
    } else {
        debug!("Failed session was already replaced; keeping the cached one");
    }
}

/// Lazily created, self-healing chat session.
///
/// The value is owned by whoever wires the application together and handed
/// to the [`ChatController`](super::chat::ChatController) behind an `Arc`.
pub struct ResponseSession {
    gateway: Arc<dyn LlmGateway>,
    settings: SessionSettings,
    slot: SessionSlot,
    sessions_created: AtomicU64,
}

impl ResponseSession {
    pub fn new(gateway: Arc<dyn LlmGateway>, settings: SessionSettings) -> Self {
        Self {
            gateway,
            settings,
            slot: Arc::new(Mutex::new(None)),
            sessions_created: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Whether a session is currently cached
    pub fn has_live_session(&self) -> bool {
        lock_slot(&self.slot).is_some()
    }

    /// How many sessions this value has created so far
    pub fn sessions_created(&self) -> u64 {
        self.sessions_created.load(Ordering::SeqCst)
    }

    /// Drop the cached session. The next request creates a new one.
    pub fn invalidate(&self) {
        invalidate_slot(&self.slot);
    }

    /// Send `text` and wait for the whole answer.
    pub async fn request_complete(&self, text: &str) -> Result<String, ResponseError> {
        let session = self.live_session().await?;

        debug!("Sending single-shot request: {}", truncate(text, 80));
        match session.send(text).await {
            Ok(answer) => {
                debug!("Received {} bytes", answer.len());
                Ok(answer)
            }
            Err(e) => {
                warn!("Single-shot request failed: {}", e);
                invalidate_if_current(&self.slot, &session);
                Err(ResponseError::from_gateway(e))
            }
        }
    }

    /// Like [`request_complete`](Self::request_complete), but a failure
    /// yields the localized fallback text instead of an error.
    pub async fn request_complete_or_fallback(&self, text: &str) -> String {
        match self.request_complete(text).await {
            Ok(answer) => answer,
            Err(e) => e.user_message().to_string(),
        }
    }

    /// Send `text` and return the answer as an ordered stream of chunks.
    pub async fn request_stream(&self, text: &str) -> Result<ResponseStream, ResponseError> {
        let session = self.live_session().await?;

        debug!("Sending streaming request: {}", truncate(text, 80));
        match session.send_streaming(text).await {
            Ok(handle) => Ok(ResponseStream::new(handle, Arc::clone(&self.slot), session)),
            Err(e) => {
                warn!("Streaming request failed before the first chunk: {}", e);
                invalidate_if_current(&self.slot, &session);
                Err(ResponseError::from_gateway(e))
            }
        }
    }

    /// Drive a streaming request to the end, calling `on_chunk` for each
    /// chunk in arrival order. Returns the concatenated answer.
    pub async fn request_stream_with<F>(
        &self,
        text: &str,
        mut on_chunk: F,
    ) -> Result<String, ResponseError>
    where
        F: FnMut(&str),
    {
        let mut stream = self.request_stream(text).await?;
        let mut full_text = String::new();
        while let Some(chunk) = stream.next_chunk().await {
            let chunk = chunk?;
            on_chunk(&chunk);
            full_text.push_str(&chunk);
        }
        Ok(full_text)
    }

    async fn live_session(&self) -> Result<Arc<dyn LlmSession>, ResponseError> {
        let cached = lock_slot(&self.slot).clone();
        if let Some(session) = cached {
            return Ok(session);
        }

        info!("Creating chat session with model {}", self.settings.model());
        let session: Arc<dyn LlmSession> = match self
            .gateway
            .create_session_with_system_prompt(
                self.settings.model(),
                self.settings.system_instruction(),
            )
            .await
        {
            Ok(session) => Arc::from(session),
            Err(e) => {
                warn!("Failed to create chat session: {}", e);
                return Err(ResponseError::from_gateway(e));
            }
        };

        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        *lock_slot(&self.slot) = Some(Arc::clone(&session));
        Ok(session)
    }
}

/// The chunks of one streamed answer.
///
/// Yields `Ok(chunk)` in arrival order, then either ends (`None`) or yields a
/// single `Err` and ends. A failure invalidates the session that produced
/// the stream (if it is still the cached one); [`cancel`](Self::cancel) does
/// not.
pub struct ResponseStream {
    handle: StreamHandle,
    slot: SessionSlot,
    session: Arc<dyn LlmSession>,
    delivered: usize,
    finished: bool,
}

impl ResponseStream {
    fn new(handle: StreamHandle, slot: SessionSlot, session: Arc<dyn LlmSession>) -> Self {
        Self {
            handle,
            slot,
            session,
            delivered: 0,
            finished: false,
        }
    }

    pub async fn next_chunk(&mut self) -> Option<Result<String, ResponseError>> {
        if self.finished {
            return None;
        }
        let event = self.handle.recv().await;
        self.on_event(event)
    }

    /// Stop the stream. No further chunks are yielded and the session stays
    /// usable.
    pub fn cancel(&mut self) {
        debug!("Stream cancelled after {} chunk(s)", self.delivered);
        self.handle.cancel();
        self.finished = true;
    }

    /// Number of chunks yielded so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn on_event(&mut self, event: Option<StreamEvent>) -> Option<Result<String, ResponseError>> {
        match event {
            Some(StreamEvent::Delta(chunk)) => {
                self.delivered += 1;
                Some(Ok(chunk))
            }
            Some(StreamEvent::Error(message)) => {
                Some(Err(self.fail(GatewayError::RequestFailed(message))))
            }
            Some(StreamEvent::Malformed(message)) => {
                Some(Err(self.fail(GatewayError::MalformedResponse(message))))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    fn fail(&mut self, source: GatewayError) -> ResponseError {
        self.finished = true;
        warn!("Stream failed after {} chunk(s): {}", self.delivered, source);
        invalidate_if_current(&self.slot, &self.session);

        if self.delivered > 0 {
            ResponseError::PartialStream {
                delivered: self.delivered,
                source,
            }
        } else {
            ResponseError::from_gateway(source)
        }
    }
}

impl Stream for ResponseStream {
    type Item = Result<String, ResponseError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.handle).poll_next(cx) {
            Poll::Ready(event) => Poll::Ready(this.on_event(event)),
            Poll::Pending => Poll::Pending,
        }
    }
}
