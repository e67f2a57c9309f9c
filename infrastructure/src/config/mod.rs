//! Configuration file loading for cnxh-assistant
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CNXH_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./cnxh.toml` or `./.cnxh.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/cnxh-assistant/config.toml`
//! 5. Fallback: `~/.config/cnxh-assistant/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileChatConfig, FileConfig, FileGeminiConfig, FileOutputConfig,
    FileReplConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
