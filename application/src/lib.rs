//! Application layer for cnxh-assistant
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionSettings;
pub use ports::{
    credentials::{CredentialSource, StaticCredential},
    llm_gateway::{FailureCategory, GatewayError, LlmGateway, LlmSession, StreamHandle},
    observer::{ConversationObserver, NoObserver},
};
pub use use_cases::chat::{ChatController, SubmitOutcome};
pub use use_cases::response_session::{ResponseError, ResponseSession, ResponseStream};
