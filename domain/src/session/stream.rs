//! Streaming events for LLM session communication.
//!
//! [`StreamEvent`] represents individual events in a streaming LLM response,
//! enabling real-time display of model output as it's generated.
//!
//! A stream has no explicit "done" event: the producer closing its channel is
//! the normal end. An [`Error`](StreamEvent::Error) or
//! [`Malformed`](StreamEvent::Malformed) is always the last event of a failed
//! stream.

/// An event in a streaming LLM response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model, in arrival order.
    Delta(String),
    /// The stream failed. Deltas already sent are not retracted.
    Error(String),
    /// The service answered, but the stream carried nothing usable (no text,
    /// unparsable payload).
    Malformed(String),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            StreamEvent::Error(_) | StreamEvent::Malformed(_) => None,
        }
    }

    /// Returns true if no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error(_) | StreamEvent::Malformed(_))
    }
}
