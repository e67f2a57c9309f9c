//! Infrastructure layer for cnxh-assistant
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod credentials;
pub mod gemini;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileChatConfig, FileConfig, FileGeminiConfig,
    FileOutputConfig, FileReplConfig,
};
pub use credentials::EnvCredentialSource;
pub use gemini::{
    error::{GeminiError, Result},
    gateway::{GeminiLlmGateway, GeminiOptions},
    session::GeminiSession,
};
