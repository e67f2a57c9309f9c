//! Conversation domain.
//!
//! - [`entities::Message`] - a single record in the conversation log
//! - [`store::Conversation`] - the ordered, append-only log itself

pub mod entities;
pub mod store;
