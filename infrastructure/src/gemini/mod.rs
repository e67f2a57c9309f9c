//! Google Gemini adapter
//!
//! Implements LlmGateway on top of the Gemini REST API
//! (`generateContent` / `streamGenerateContent`).

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;
pub mod sse;

#[cfg(test)]
pub(crate) mod test_server;
