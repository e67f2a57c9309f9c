//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid response mode: {0}")]
    InvalidResponseMode(String),
}
