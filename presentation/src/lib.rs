//! Presentation layer for cnxh-assistant
//!
//! This crate contains the CLI definition, the interactive chat REPL, the
//! terminal observers that render a submission while it runs, and the
//! Markdown-to-terminal renderer.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::Cli;
pub use config::{OutputConfig, ReplConfig};
pub use output::console::ConsoleFormatter;
pub use output::markdown::MarkdownRenderer;
pub use progress::reporter::TerminalObserver;
