//! Conversation observer port
//!
//! Defines the interface for reporting conversation changes while a message is
//! being answered.

use cnxh_domain::{Conversation, MessageId};

/// Callback for conversation updates during a submission
///
/// Implementations live in the presentation layer and render the log however
/// they like (terminal, plain output, ...). Every callback runs on the task
/// that drives the submission, in the order the changes happen.
pub trait ConversationObserver: Send + Sync {
    /// Called when the "response pending" indicator turns on or off
    fn on_loading_changed(&self, loading: bool);

    /// Called after every change to the conversation log
    fn on_conversation_changed(&self, _conversation: &Conversation) {}

    /// Called for each streamed chunk, after it was appended to message `id`
    fn on_chunk(&self, _id: MessageId, _chunk: &str) {}

    /// Called with the user-facing text when a submission fails
    fn on_error(&self, _message: &str) {}
}

/// No-op observer for when nothing needs to be rendered
pub struct NoObserver;

impl ConversationObserver for NoObserver {
    fn on_loading_changed(&self, _loading: bool) {}
}
