//! Chat use case.
//!
//! [`ChatController`] is the single entry point the presentation layer calls
//! when the user sends a message. It owns the [`Conversation`] log and drives
//! one [`ResponseSession`] request per submission:
//!
//! 1. append the user's message and an empty assistant placeholder
//! 2. fill the placeholder (whole answer or chunk by chunk)
//! 3. on failure or cancellation, remove the placeholder again
//!
//! The loading flag is on for exactly the duration of step 2.

use crate::ports::observer::ConversationObserver;
use crate::use_cases::response_session::{ResponseError, ResponseSession};
use cnxh_domain::{
    Conversation, DomainError, MessageId, ResponseMode, UpdateMode, truncate,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a submission ended
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The placeholder now holds the full answer
    Answered {
        user: MessageId,
        assistant: MessageId,
    },
    /// The placeholder was removed; only the user's message was kept
    Failed { user: MessageId, error: ResponseError },
    /// The user stopped the response; only the user's message was kept
    Cancelled { user: MessageId },
}

impl SubmitOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, SubmitOutcome::Answered { .. })
    }

    pub fn user_id(&self) -> MessageId {
        match self {
            SubmitOutcome::Answered { user, .. }
            | SubmitOutcome::Failed { user, .. }
            | SubmitOutcome::Cancelled { user } => *user,
        }
    }

    pub fn error(&self) -> Option<&ResponseError> {
        match self {
            SubmitOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

enum Interrupted {
    Failed(ResponseError),
    Cancelled,
}

/// Conversation state plus the session that answers it
pub struct ChatController {
    conversation: Conversation,
    session: Arc<ResponseSession>,
    mode: ResponseMode,
    greeting: Option<String>,
    loading: bool,
}

impl ChatController {
    /// Create a controller with an empty conversation
    pub fn new(session: Arc<ResponseSession>, mode: ResponseMode) -> Self {
        Self {
            conversation: Conversation::new(),
            session,
            mode,
            greeting: None,
            loading: false,
        }
    }

    /// Seed the conversation (now and after every [`reset`](Self::reset))
    /// with an assistant greeting
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        self.conversation = Conversation::with_greeting(greeting.clone());
        self.greeting = Some(greeting);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn session(&self) -> &Arc<ResponseSession> {
        &self.session
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ResponseMode) {
        if self.mode != mode {
            info!("Response mode changed: {} -> {}", self.mode, mode);
        }
        self.mode = mode;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start over: clear the log, re-seed the greeting and drop the session
    /// so the model forgets earlier turns too.
    pub fn reset(&mut self) {
        self.conversation = match &self.greeting {
            Some(greeting) => Conversation::with_greeting(greeting.clone()),
            None => Conversation::new(),
        };
        self.session.invalidate();
        info!("Conversation reset");
    }

    /// Empty the visible log but keep the session, so the model still
    /// remembers earlier turns
    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
        debug!("Conversation log cleared");
    }

    /// Submit a user message and fill in the answer.
    ///
    /// Returns `Err` only for input that was rejected before anything was
    /// recorded (an empty message). Request failures are reported through
    /// the observer and [`SubmitOutcome::Failed`].
    pub async fn submit(
        &mut self,
        text: &str,
        observer: &dyn ConversationObserver,
    ) -> Result<SubmitOutcome, DomainError> {
        self.submit_with_cancel(text, observer, &CancellationToken::new())
            .await
    }

    /// [`submit`](Self::submit) that stops early when `cancel` fires.
    ///
    /// A cancelled submission removes the placeholder like a failure does,
    /// but keeps the session and reports no error.
    pub async fn submit_with_cancel(
        &mut self,
        text: &str,
        observer: &dyn ConversationObserver,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyMessage);
        }

        info!("Submitting message ({}): {}", self.mode, truncate(text, 80));

        let user = self.conversation.append_user(text);
        observer.on_conversation_changed(&self.conversation);
        self.set_loading(true, observer);

        let placeholder = self.conversation.append_placeholder();
        observer.on_conversation_changed(&self.conversation);

        let result = match self.mode {
            ResponseMode::SingleShot => {
                self.fill_single_shot(text, placeholder, observer, cancel)
                    .await
            }
            ResponseMode::Streaming => {
                self.fill_streaming(text, placeholder, observer, cancel)
                    .await
            }
        };

        let outcome = match result {
            Ok(()) => SubmitOutcome::Answered {
                user,
                assistant: placeholder,
            },
            Err(Interrupted::Failed(error)) => {
                warn!("Submission failed: {}", error);
                self.roll_back(placeholder, observer);
                observer.on_error(error.user_message());
                SubmitOutcome::Failed { user, error }
            }
            Err(Interrupted::Cancelled) => {
                info!("Submission cancelled");
                self.roll_back(placeholder, observer);
                SubmitOutcome::Cancelled { user }
            }
        };

        self.set_loading(false, observer);
        Ok(outcome)
    }

    async fn fill_single_shot(
        &mut self,
        text: &str,
        placeholder: MessageId,
        observer: &dyn ConversationObserver,
        cancel: &CancellationToken,
    ) -> Result<(), Interrupted> {
        let session = Arc::clone(&self.session);
        let answer = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Interrupted::Cancelled),
            answer = session.request_complete(text) => answer.map_err(Interrupted::Failed)?,
        };

        self.conversation
            .update_text(placeholder, UpdateMode::Replace, &answer);
        observer.on_conversation_changed(&self.conversation);
        Ok(())
    }

    async fn fill_streaming(
        &mut self,
        text: &str,
        placeholder: MessageId,
        observer: &dyn ConversationObserver,
        cancel: &CancellationToken,
    ) -> Result<(), Interrupted> {
        let session = Arc::clone(&self.session);
        let mut stream = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Interrupted::Cancelled),
            stream = session.request_stream(text) => stream.map_err(Interrupted::Failed)?,
        };

        loop {
            let item = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    stream.cancel();
                    return Err(Interrupted::Cancelled);
                }
                item = stream.next_chunk() => item,
            };

            match item {
                Some(Ok(chunk)) => {
                    let outcome =
                        self.conversation
                            .update_text(placeholder, UpdateMode::Append, &chunk);
                    if outcome.is_applied() {
                        observer.on_chunk(placeholder, &chunk);
                        observer.on_conversation_changed(&self.conversation);
                    }
                }
                Some(Err(error)) => return Err(Interrupted::Failed(error)),
                None => {
                    debug!("Stream finished after {} chunk(s)", stream.delivered());
                    return Ok(());
                }
            }
        }
    }

    fn roll_back(&mut self, placeholder: MessageId, observer: &dyn ConversationObserver) {
        if self.conversation.remove(placeholder).is_some() {
            observer.on_conversation_changed(&self.conversation);
        }
    }

    fn set_loading(&mut self, loading: bool, observer: &dyn ConversationObserver) {
        self.loading = loading;
        observer.on_loading_changed(loading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSettings;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::observer::NoObserver;
    use crate::use_cases::response_session::tests::{ScriptedGateway, Turn, chunks};
    use cnxh_domain::{FallbackText, Sender, StreamEvent};
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Loading(bool),
        Changed(usize),
        Chunk(String),
        Error(String),
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<Seen>>,
        cancel_on_chunk: Option<CancellationToken>,
    }

    impl RecordingObserver {
        fn cancelling(token: CancellationToken) -> Self {
            Self {
                cancel_on_chunk: Some(token),
                ..Self::default()
            }
        }

        fn events(&self) -> Vec<Seen> {
            self.events.lock().unwrap().clone()
        }

        fn loading_events(&self) -> Vec<bool> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Seen::Loading(l) => Some(l),
                    _ => None,
                })
                .collect()
        }
    }

    impl ConversationObserver for RecordingObserver {
        fn on_loading_changed(&self, loading: bool) {
            self.events.lock().unwrap().push(Seen::Loading(loading));
        }

        fn on_conversation_changed(&self, conversation: &Conversation) {
            self.events
                .lock()
                .unwrap()
                .push(Seen::Changed(conversation.len()));
        }

        fn on_chunk(&self, _id: MessageId, chunk: &str) {
            self.events
                .lock()
                .unwrap()
                .push(Seen::Chunk(chunk.to_string()));
            if let Some(token) = &self.cancel_on_chunk {
                token.cancel();
            }
        }

        fn on_error(&self, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push(Seen::Error(message.to_string()));
        }
    }

    const GREETING: &str = "Xin chào!";

    fn controller(mode: ResponseMode, turns: Vec<Turn>) -> (Arc<ScriptedGateway>, ChatController) {
        let gateway = Arc::new(ScriptedGateway::new(turns));
        let session = Arc::new(ResponseSession::new(
            gateway.clone(),
            SessionSettings::default(),
        ));
        let controller = ChatController::new(session, mode).with_greeting(GREETING);
        (gateway, controller)
    }

    fn texts(controller: &ChatController) -> Vec<(Sender, String)> {
        controller
            .conversation()
            .messages()
            .iter()
            .map(|m| (m.sender(), m.text().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_single_shot_success_adds_two_messages() {
        let (_gateway, mut chat) = controller(
            ResponseMode::SingleShot,
            vec![Turn::Reply("Giai cấp công nhân là...".into())],
        );
        let observer = RecordingObserver::default();

        let outcome = chat.submit("Giai cấp là gì?", &observer).await.unwrap();

        assert!(outcome.is_answered());
        assert_eq!(
            texts(&chat),
            vec![
                (Sender::Assistant, GREETING.to_string()),
                (Sender::User, "Giai cấp là gì?".to_string()),
                (Sender::Assistant, "Giai cấp công nhân là...".to_string()),
            ]
        );
        assert_eq!(observer.loading_events(), vec![true, false]);
        assert!(!chat.is_loading());
    }

    #[tokio::test]
    async fn test_streaming_accumulates_chunks_in_placeholder() {
        let (_gateway, mut chat) = controller(
            ResponseMode::Streaming,
            vec![chunks(&["Giai", " cấp", " là..."])],
        );
        let observer = RecordingObserver::default();

        let outcome = chat.submit("Giai cấp là gì?", &observer).await.unwrap();

        let SubmitOutcome::Answered { assistant, .. } = outcome else {
            panic!("expected an answer, got {:?}", outcome);
        };
        assert_eq!(
            chat.conversation().get(assistant).unwrap().text(),
            "Giai cấp là..."
        );
        assert_eq!(chat.conversation().len(), 3);

        let chunks: Vec<_> = observer
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Seen::Chunk(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(chunks, vec!["Giai", " cấp", " là..."]);
    }

    #[tokio::test]
    async fn test_observer_sees_user_message_before_loading() {
        let (_gateway, mut chat) =
            controller(ResponseMode::SingleShot, vec![Turn::Reply("ok".into())]);
        let observer = RecordingObserver::default();

        chat.submit("hỏi", &observer).await.unwrap();

        let events = observer.events();
        assert_eq!(
            &events[..3],
            &[Seen::Changed(2), Seen::Loading(true), Seen::Changed(3)]
        );
        assert_eq!(events.last(), Some(&Seen::Loading(false)));
    }

    #[tokio::test]
    async fn test_single_shot_failure_keeps_only_user_message() {
        let (gateway, mut chat) = controller(
            ResponseMode::SingleShot,
            vec![
                Turn::Fail(GatewayError::RequestFailed("HTTP 500".into())),
                Turn::Reply("Lần hai".into()),
            ],
        );
        let observer = RecordingObserver::default();

        let outcome = chat.submit("Câu hỏi", &observer).await.unwrap();

        assert!(matches!(
            outcome.error(),
            Some(ResponseError::Transport(_))
        ));
        assert_eq!(chat.conversation().len(), 2);
        assert!(chat.conversation().last().unwrap().is_user());
        assert!(
            observer
                .events()
                .contains(&Seen::Error(FallbackText::transport().to_string()))
        );
        assert_eq!(observer.loading_events(), vec![true, false]);
        assert!(!chat.session().has_live_session());

        let outcome = chat.submit("Câu hỏi", &NoObserver).await.unwrap();
        assert!(outcome.is_answered());
        assert_eq!(gateway.creates.load(Ordering::SeqCst), 2);
        assert_eq!(chat.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_partial_stream_failure_discards_partial_text() {
        let (_gateway, mut chat) = controller(
            ResponseMode::Streaming,
            vec![Turn::Stream(vec![
                StreamEvent::Delta("Giai".into()),
                StreamEvent::Error("reset".into()),
            ])],
        );
        let observer = RecordingObserver::default();

        let outcome = chat.submit("hỏi", &observer).await.unwrap();

        assert!(matches!(
            outcome,
            SubmitOutcome::Failed {
                error: ResponseError::PartialStream { delivered: 1, .. },
                ..
            }
        ));
        assert_eq!(
            texts(&chat),
            vec![
                (Sender::Assistant, GREETING.to_string()),
                (Sender::User, "hỏi".to_string()),
            ]
        );
        assert!(!chat.session().has_live_session());
    }

    #[tokio::test]
    async fn test_missing_credential_reports_configuration_text() {
        let gateway = Arc::new(ScriptedGateway::without_credential());
        let session = Arc::new(ResponseSession::new(gateway, SessionSettings::default()));
        let mut chat = ChatController::new(session, ResponseMode::Streaming);
        let observer = RecordingObserver::default();

        let outcome = chat.submit("hỏi", &observer).await.unwrap();

        assert!(matches!(
            outcome.error(),
            Some(ResponseError::Configuration(_))
        ));
        assert!(
            observer
                .events()
                .contains(&Seen::Error(FallbackText::configuration().to_string()))
        );
        assert_eq!(chat.conversation().len(), 1);
        assert_eq!(chat.session().sessions_created(), 0);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let (gateway, mut chat) = controller(ResponseMode::Streaming, vec![]);
        let observer = RecordingObserver::default();

        let err = chat.submit("   \n", &observer).await.unwrap_err();

        assert_eq!(err, DomainError::EmptyMessage);
        assert_eq!(chat.conversation().len(), 1);
        assert!(observer.events().is_empty());
        assert_eq!(gateway.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_message_is_trimmed() {
        let (gateway, mut chat) =
            controller(ResponseMode::SingleShot, vec![Turn::Reply("ok".into())]);

        chat.submit("  hỏi  ", &NoObserver).await.unwrap();

        assert_eq!(*gateway.sent.lock().unwrap(), vec!["hỏi"]);
        assert_eq!(chat.conversation().messages()[1].text(), "hỏi");
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_removes_placeholder_keeps_session() {
        let (_gateway, mut chat) = controller(
            ResponseMode::Streaming,
            vec![Turn::StreamThenHang(vec!["Giai".into()])],
        );
        let token = CancellationToken::new();
        let observer = RecordingObserver::cancelling(token.clone());

        let outcome = chat
            .submit_with_cancel("hỏi", &observer, &token)
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Cancelled { .. }));
        assert_eq!(chat.conversation().len(), 2);
        assert!(chat.conversation().last().unwrap().is_user());
        assert!(chat.session().has_live_session());
        assert_eq!(observer.loading_events(), vec![true, false]);
        assert!(
            !observer
                .events()
                .iter()
                .any(|e| matches!(e, Seen::Error(_)))
        );
    }

    #[tokio::test]
    async fn test_cancel_before_single_shot_answer() {
        let (_gateway, mut chat) = controller(ResponseMode::SingleShot, vec![]);
        let token = CancellationToken::new();
        token.cancel();

        let outcome = chat
            .submit_with_cancel("hỏi", &NoObserver, &token)
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Cancelled { .. }));
        assert_eq!(chat.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_reseeds_greeting_and_drops_session() {
        let (gateway, mut chat) = controller(
            ResponseMode::SingleShot,
            vec![Turn::Reply("a".into()), Turn::Reply("b".into())],
        );

        chat.submit("1", &NoObserver).await.unwrap();
        assert!(chat.session().has_live_session());

        chat.reset();
        assert_eq!(texts(&chat), vec![(Sender::Assistant, GREETING.to_string())]);
        assert!(!chat.session().has_live_session());

        chat.submit("2", &NoObserver).await.unwrap();
        assert_eq!(gateway.creates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_conversation_keeps_session() {
        let (gateway, mut chat) =
            controller(ResponseMode::SingleShot, vec![Turn::Reply("a".into())]);

        chat.submit("1", &NoObserver).await.unwrap();
        chat.clear_conversation();

        assert!(chat.conversation().is_empty());
        assert!(chat.session().has_live_session());
        assert_eq!(gateway.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_set_mode_switches_request_kind() {
        let (_gateway, mut chat) = controller(
            ResponseMode::SingleShot,
            vec![Turn::Reply("một".into()), chunks(&["h", "ai"])],
        );

        chat.submit("1", &NoObserver).await.unwrap();
        chat.set_mode(ResponseMode::Streaming);
        assert_eq!(chat.mode(), ResponseMode::Streaming);
        chat.submit("2", &NoObserver).await.unwrap();

        assert_eq!(chat.conversation().last().unwrap().text(), "hai");
        assert_eq!(chat.conversation().len(), 5);
    }
}
