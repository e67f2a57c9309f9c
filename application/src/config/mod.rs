//! Application-level configuration.
//!
//! - [`SessionSettings`]: which model a chat session talks to and the system
//!   instruction it is created with

pub mod session_settings;

pub use session_settings::SessionSettings;
