//! Slash commands understood by the REPL

use cnxh_domain::ResponseMode;

/// A parsed `/command` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    /// Empty the visible log, keep the model's context
    Clear,
    /// Start a new conversation with a fresh session
    Reset,
    /// Show (`None`) or switch the response mode
    Mode(Option<ResponseMode>),
    InvalidMode(String),
    History,
    Model,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line, returning `None` when it is not a command
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return None;
        }

        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or(line);
        let arg = parts.next();

        let command = match name {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/clear" => ReplCommand::Clear,
            "/reset" | "/new" => ReplCommand::Reset,
            "/mode" => match arg {
                None => ReplCommand::Mode(None),
                Some(value) => match value.parse() {
                    Ok(mode) => ReplCommand::Mode(Some(mode)),
                    Err(_) => ReplCommand::InvalidMode(value.to_string()),
                },
            },
            "/history" => ReplCommand::History,
            "/model" => ReplCommand::Model,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(name.to_string()),
        };
        Some(command)
    }

    /// Help text listing every command
    pub fn help() -> &'static str {
        "Commands:
  /help, /h, /?        - Show this help
  /clear               - Clear the screen log (the model keeps the context)
  /reset, /new         - Start a new conversation
  /mode [stream|single] - Show or switch the response mode
  /history             - Show the conversation so far
  /model               - Show the current model
  /quit, /exit, /q     - Exit chat"
    }
}
