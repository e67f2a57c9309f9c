//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chat;
pub mod response_session;
