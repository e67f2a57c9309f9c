//! CLI entrypoint for cnxh-assistant
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cnxh_application::{ChatController, ResponseSession, SessionSettings};
use cnxh_domain::Persona;
use cnxh_infrastructure::{ConfigLoader, EnvCredentialSource, FileConfig, GeminiLlmGateway};
use cnxh_presentation::{ChatRepl, Cli, OutputConfig, ReplConfig};
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines reach the file
    let _log_guard = init_logging(&cli)?;

    info!("Starting cnxh-assistant");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    if let Some(model) = &cli.model {
        config.gemini.model = model.clone();
    }
    config.validate().context("Invalid configuration")?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let mode = match cli.response_mode_override() {
        Some(mode) => mode,
        None => config.chat.parse_response_mode()?,
    };

    // === Dependency Injection ===
    let credentials = Arc::new(EnvCredentialSource::new(config.gemini.api_key_env.clone()));
    let gateway = Arc::new(GeminiLlmGateway::new(
        credentials,
        config.gemini.to_options(),
    ));

    let persona = Persona::default();
    let settings = SessionSettings::from_persona(config.gemini.parse_model(), &persona);
    info!("Model: {}, mode: {}", settings.model(), mode);

    let session = Arc::new(ResponseSession::new(gateway, settings));
    let mut controller = ChatController::new(session, mode);

    // Single question mode
    if let Some(question) = cli.question.as_deref() {
        let mut repl = configure_repl(ChatRepl::new(controller), &config, &cli);
        let answered = repl.ask(question).await;
        return Ok(if answered {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    // Chat mode
    if config.chat.greeting {
        controller = controller.with_greeting(persona.greeting());
    }
    let mut repl =
        configure_repl(ChatRepl::new(controller), &config, &cli).with_title(persona.title());
    repl.run().await?;

    Ok(ExitCode::SUCCESS)
}

fn configure_repl(repl: ChatRepl, config: &FileConfig, cli: &Cli) -> ChatRepl {
    repl.with_output(OutputConfig {
        color: config.output.color && !cli.no_color,
        render_markdown: config.output.render_markdown,
    })
    .with_config(ReplConfig {
        show_progress: config.repl.show_progress,
        history_file: config.repl.history_file.clone(),
    })
    .with_quiet(cli.quiet)
}

/// Initialize logging based on verbosity level
///
/// Logs go to stderr, or to `--log-file` when given so they do not mix
/// with the chat output.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}
