//! Domain layer for cnxh-assistant
//!
//! This crate contains the conversation log, value objects and the fixed
//! persona texts. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Conversation
//!
//! An ordered, append-only log of [`Message`]s. The only in-place mutation is
//! filling the text of a pending assistant placeholder while a response
//! arrives.
//!
//! ## Response modes
//!
//! - **Single-shot**: the whole answer replaces the placeholder at once
//! - **Streaming**: each chunk is appended to the placeholder as it arrives

pub mod config;
pub mod conversation;
pub mod core;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use config::ResponseMode;
pub use conversation::{
    entities::{Message, MessageId, Sender},
    store::{Conversation, UpdateMode, UpdateOutcome},
};
pub use core::{error::DomainError, model::Model, string::truncate};
pub use prompt::{FallbackText, Persona};
pub use session::stream::StreamEvent;
