//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::chat::command::ReplCommand;
use crate::config::{OutputConfig, ReplConfig};
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::TerminalObserver;
use cnxh_application::{ChatController, SubmitOutcome};
use cnxh_domain::FallbackText;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Interactive chat REPL
pub struct ChatRepl {
    controller: ChatController,
    title: String,
    output: OutputConfig,
    config: ReplConfig,
    quiet: bool,
}

impl ChatRepl {
    /// Create a new ChatRepl around a controller
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller,
            title: "cnxh-assistant".to_string(),
            output: OutputConfig::default(),
            config: ReplConfig::default(),
            quiet: false,
        }
    }

    /// Title shown in the welcome banner
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Print bare answers only: no spinner, no labels
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = self.config.history_path();

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    // Handle commands
                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    println!();
                    self.ask(line).await;
                    println!();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path
            && let Err(e) = rl.save_history(path)
        {
            warn!("Could not save history to {}: {}", path.display(), e);
        }

        Ok(())
    }

    /// Submit one message and print the answer.
    ///
    /// Ctrl-C while the answer is pending cancels it. Returns `true` when an
    /// answer was received.
    pub async fn ask(&mut self, text: &str) -> bool {
        let observer = TerminalObserver::new()
            .with_progress(self.config.show_progress && !self.quiet)
            .with_label(!self.quiet);

        let cancel = CancellationToken::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    debug!("Ctrl-C received, cancelling the pending answer");
                    cancel.cancel();
                }
            }
        });

        let result = self
            .controller
            .submit_with_cancel(text, &observer, &cancel)
            .await;
        watcher.abort();

        match result {
            Ok(SubmitOutcome::Answered { assistant, .. }) => {
                if observer.take_streamed().is_none()
                    && let Some(message) = self.controller.conversation().get(assistant)
                {
                    if self.quiet {
                        println!(
                            "{}",
                            ConsoleFormatter::answer(message.text(), self.output.render_markdown)
                        );
                    } else {
                        print!(
                            "{}",
                            ConsoleFormatter::message(message, self.output.render_markdown)
                        );
                    }
                }
                true
            }
            // Already reported through the observer
            Ok(SubmitOutcome::Failed { .. }) => false,
            Ok(SubmitOutcome::Cancelled { .. }) => {
                observer.discard_partial();
                println!("{}", ConsoleFormatter::notice(FallbackText::cancelled()));
                false
            }
            Err(e) => {
                eprintln!("{}", ConsoleFormatter::error(&e.to_string()));
                false
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", ConsoleFormatter::header(&self.title));
        println!();
        println!(
            "Model: {}    Mode: {}",
            self.controller.session().settings().model(),
            self.controller.mode()
        );
        println!();
        println!("{}", ReplCommand::help());
        println!();

        if let Some(greeting) = self.controller.conversation().last() {
            println!(
                "{}",
                ConsoleFormatter::message(greeting, self.output.render_markdown)
            );
        }
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                println!("{}", ReplCommand::help());
                println!();
            }
            ReplCommand::Clear => {
                self.controller.clear_conversation();
                println!(
                    "{}",
                    ConsoleFormatter::notice("Conversation cleared (the model keeps its context)")
                );
            }
            ReplCommand::Reset => {
                self.controller.reset();
                println!("{}", ConsoleFormatter::notice("Started a new conversation"));
                if let Some(greeting) = self.controller.conversation().last() {
                    println!();
                    println!(
                        "{}",
                        ConsoleFormatter::message(greeting, self.output.render_markdown)
                    );
                }
            }
            ReplCommand::Mode(None) => {
                println!("Response mode: {}", self.controller.mode());
            }
            ReplCommand::Mode(Some(mode)) => {
                self.controller.set_mode(mode);
                println!("Response mode: {}", mode);
            }
            ReplCommand::InvalidMode(value) => {
                println!(
                    "{}",
                    ConsoleFormatter::error(&format!(
                        "Unknown mode '{}' (expected stream or single)",
                        value
                    ))
                );
            }
            ReplCommand::History => {
                print!(
                    "{}",
                    ConsoleFormatter::history(
                        self.controller.conversation(),
                        self.output.render_markdown
                    )
                );
            }
            ReplCommand::Model => {
                println!("Model: {}", self.controller.session().settings().model());
            }
            ReplCommand::Unknown(name) => {
                println!("Unknown command: {}", name);
                println!("Type /help for available commands");
            }
        }
        false
    }
}
