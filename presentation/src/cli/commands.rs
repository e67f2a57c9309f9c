//! CLI command definitions

use clap::Parser;
use cnxh_domain::ResponseMode;
use std::path::PathBuf;

/// CLI arguments for cnxh-assistant
#[derive(Parser, Debug)]
#[command(name = "cnxh-assistant")]
#[command(author, version, about = "Trợ lý AI về Chủ nghĩa xã hội khoa học (Gemini)")]
#[command(long_about = r#"
cnxh-assistant is a terminal chat assistant backed by Google Gemini. It answers
questions about scientific socialism in Vietnamese.

Answers are either streamed as they are generated (default) or shown in one
piece once complete (--single).

The API key is read from the environment: GEMINI_API_KEY, then API_KEY
(configurable with gemini.api_key_env).

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./cnxh.toml         Project-level config
3. ~/.config/cnxh-assistant/config.toml   Global config

Example:
  cnxh-assistant "Chủ nghĩa xã hội khoa học là gì?"
  cnxh-assistant --single -m gemini-2.5-pro "Sứ mệnh lịch sử của giai cấp công nhân"
  cnxh-assistant
"#)]
pub struct Cli {
    /// Ask one question and exit (starts the interactive chat when omitted)
    pub question: Option<String>,

    /// Model to answer with (overrides gemini.model)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Show each answer in one piece once it is complete
    #[arg(long, conflicts_with = "stream")]
    pub single: bool,

    /// Stream answers as they are generated
    #[arg(long)]
    pub stream: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Response mode requested on the command line, if any
    pub fn response_mode_override(&self) -> Option<ResponseMode> {
        if self.single {
            Some(ResponseMode::SingleShot)
        } else if self.stream {
            Some(ResponseMode::Streaming)
        } else {
            None
        }
    }
}
