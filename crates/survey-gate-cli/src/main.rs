// crates/survey-gate-cli/src/main.rs
// ============================================================================
// Module: Survey Gate CLI Entry Point
// Description: Command dispatcher for the survey gate server and stores.
// Purpose: Run the gate, check configuration, and inspect issued tokens.
// Dependencies: clap, survey-gate-config, survey-gate-core, survey-gate-server, tokio
// ============================================================================

//! ## Overview
//! The `survey-gate` CLI serves the forward-auth endpoint, validates
//! `survey-gate.toml` (including catalog and requirement checks), activates
//! surveys against the configured token store, and looks up issued tokens.
//! Every command takes `--config`; without it the path comes from
//! `SURVEY_GATE_CONFIG` or the default filename.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use survey_gate_config::SurveyGateConfig;
use survey_gate_config::TokenStoreType;
use survey_gate_config::activate_survey;
use survey_gate_config::config_toml_example;
use survey_gate_config::validate_catalog;
use survey_gate_core::AttributeCatalog;
use survey_gate_core::InMemoryParticipantTokenStore;
use survey_gate_core::ParticipantTokenStore;
use survey_gate_core::SurveyId;
use survey_gate_server::SurveyGateServer;
use survey_gate_server::build_token_store;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definitions
// ============================================================================

/// Survey gate command line.
#[derive(Parser, Debug)]
#[command(name = "survey-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the forward-auth endpoint.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Survey activation utilities.
    Survey {
        /// Selected survey subcommand.
        #[command(subcommand)]
        command: SurveyCommand,
    },
    /// Participant token utilities.
    Token {
        /// Selected token subcommand.
        #[command(subcommand)]
        command: TokenCommand,
    },
}

/// Shared `--config` argument.
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Path to survey-gate.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate configuration, catalog, and survey requirements.
    Validate(ConfigArgs),
    /// Print the canonical example configuration.
    Example,
}

/// Survey subcommands.
#[derive(Subcommand, Debug)]
enum SurveyCommand {
    /// Check one survey and prepare its token storage.
    Activate(SurveyActivateCommand),
}

/// Arguments for `survey activate`.
#[derive(Args, Debug)]
struct SurveyActivateCommand {
    /// Survey identifier.
    #[arg(value_name = "SURVEY_ID")]
    survey_id: String,
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Print the token issued to an email for a survey.
    Lookup(TokenLookupCommand),
}

/// Arguments for `token lookup`.
#[derive(Args, Debug)]
struct TokenLookupCommand {
    /// Survey identifier.
    #[arg(value_name = "SURVEY_ID")]
    survey_id: String,
    /// Participant email (exact match).
    #[arg(value_name = "EMAIL")]
    email: String,
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(args) => command_serve(args).await,
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(args) => command_config_validate(&args),
            ConfigCommand::Example => command_config_example(),
        },
        Commands::Survey {
            command: SurveyCommand::Activate(command),
        } => command_survey_activate(&command),
        Commands::Token {
            command: TokenCommand::Lookup(command),
        } => command_token_lookup(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(args: ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    let server = tokio::task::spawn_blocking(move || SurveyGateServer::from_config(&config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    write_stderr_line(&format!("survey-gate listening on {}", server.bind_addr()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the config validation command.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    let catalog = check_surveys(&config)?;
    let enabled = config.surveys.iter().filter(|survey| survey.enabled).count();
    write_stdout_line(&format!(
        "config ok: {} surveys ({enabled} gated), {} catalog attributes",
        config.surveys.len(),
        catalog.len()
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_line(config_toml_example().trim_end())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the survey activation command.
fn command_survey_activate(command: &SurveyActivateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let survey_id = SurveyId::new(command.survey_id.clone());
    let store = build_token_store(&config.token_store)
        .map_err(|err| CliError::new(format!("token store unavailable: {err}")))?;
    let record = activate_survey(&config, &survey_id, &store)
        .map_err(|err| CliError::new(format!("activation failed: {err}")))?;
    let message = if record.requirement.enabled {
        format!("survey {survey_id} activated")
    } else {
        format!("survey {survey_id} validated; gating is disabled")
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the token lookup command.
fn command_token_lookup(command: &TokenLookupCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    if config.token_store.store_type == TokenStoreType::Memory {
        return Err(CliError::new("token lookup requires a sqlite token_store".to_string()));
    }
    let store = build_token_store(&config.token_store)
        .map_err(|err| CliError::new(format!("token store unavailable: {err}")))?;
    let survey_id = SurveyId::new(command.survey_id.clone());
    let found = store
        .find(&survey_id, &command.email)
        .map_err(|err| CliError::new(format!("token lookup failed: {err}")))?;
    let Some(token) = found else {
        write_stdout_line(&format!("no token for survey {survey_id}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::FAILURE);
    };
    let payload = serde_json::to_string_pretty(&token)
        .map_err(|err| CliError::new(format!("token serialization failed: {err}")))?;
    write_stdout_line(&payload).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads configuration from the CLI path or default resolution.
fn load_config(path: Option<&Path>) -> CliResult<SurveyGateConfig> {
    SurveyGateConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Checks the catalog and every survey requirement without touching the
/// configured token store, returning the validated catalog.
fn check_surveys(config: &SurveyGateConfig) -> CliResult<AttributeCatalog> {
    let catalog = validate_catalog(config)
        .map_err(|err| CliError::new(format!("config invalid: {err}")))?;
    let scratch = InMemoryParticipantTokenStore::new();
    for survey in &config.surveys {
        activate_survey(config, &survey.survey_id(), &scratch)
            .map_err(|err| CliError::new(format!("config invalid: {err}")))?;
    }
    Ok(catalog)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
