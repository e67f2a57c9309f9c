//! Conversation store
//!
//! An ordered log of [`Message`]s. Records are only ever appended at the end;
//! the one mutation allowed in place is filling the text of an assistant
//! placeholder while its response arrives, and the one deletion is rolling
//! that placeholder back after a failed request.

use super::entities::{Message, MessageId, Sender};

/// How [`Conversation::update_text`] applies new text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Overwrite the current text (single-shot responses)
    Replace,
    /// Append a delta to the current text (streamed chunks)
    Append,
}

/// Result of [`Conversation::update_text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The message was found and its text changed
    Applied,
    /// No message with that id exists (for example, it was already rolled
    /// back). Nothing was changed.
    Missing,
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied)
    }
}

/// Ordered, append-only conversation log (Aggregate)
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation that opens with an assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.append(Sender::Assistant, greeting);
        conversation
    }

    /// Append a message at the end of the log and return its id
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> MessageId {
        let id = self.allocate_id();
        self.messages.push(Message::new(id, sender, text));
        id
    }

    pub fn append_user(&mut self, text: impl Into<String>) -> MessageId {
        self.append(Sender::User, text)
    }

    /// Append an empty assistant record to be filled by a response
    pub fn append_placeholder(&mut self) -> MessageId {
        self.append(Sender::Assistant, String::new())
    }

    /// Replace or extend the text of the message with `id`.
    ///
    /// Updating an id that is not (or no longer) in the log is a no-op
    /// reported as [`UpdateOutcome::Missing`]: an in-flight chunk may arrive
    /// after its placeholder was removed.
    pub fn update_text(&mut self, id: MessageId, mode: UpdateMode, text: &str) -> UpdateOutcome {
        let Some(message) = self.messages.iter_mut().find(|m| m.id() == id) else {
            return UpdateOutcome::Missing;
        };

        match mode {
            UpdateMode::Replace => message.replace_text(text),
            UpdateMode::Append => message.append_text(text),
        }
        UpdateOutcome::Applied
    }

    /// Remove the message with `id`, returning it if it existed
    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.id() == id)?;
        Some(self.messages.remove(index))
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message. Ids keep increasing, so ids handed out before the
    /// clear never match a later message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId::new(self.next_id)
    }
}
