// crates/survey-gate-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Tests
// Description: Unit tests for argument parsing and command execution.
// Purpose: Ensure commands fail closed on invalid config and stores.
// Dependencies: survey-gate-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Parses command lines with clap and runs the config, survey, and token
//! commands against temporary config files and SQLite stores.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use survey_gate_core::IdentityAttributes;
use survey_gate_core::IdentityMapping;
use survey_gate_core::ParticipantIdentity;
use survey_gate_core::ParticipantTokenManager;
use survey_gate_core::RandomTokenGenerator;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveySchedule;
use survey_gate_core::TokenRequest;
use survey_gate_server::build_token_store;

use super::Cli;
use super::Commands;
use super::ConfigArgs;
use super::ConfigCommand;
use super::SurveyActivateCommand;
use super::TokenCommand;
use super::TokenLookupCommand;
use super::check_surveys;
use super::command_config_validate;
use super::command_survey_activate;
use super::command_token_lookup;
use super::load_config;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes a config file into `dir` and returns its path.
fn write_config(dir: &Path, store: &str, department: &str) -> PathBuf {
    let text = format!(
        r#"
[server]
survey_url = "https://surveys.example.org/{{survey_id}}"

[identity]
auth_source = "campus"
login_url = "https://idp.example.org/login?as={{auth_source}}&to={{return_to}}"

[catalog.department]
label = "Department"
help = "Department"
options = ["cs", "math"]

[[surveys]]
id = "42"
enabled = true

[surveys.required]
department = "{department}"

{store}
"#
    );
    let path = dir.join("survey-gate.toml");
    std::fs::write(&path, text).unwrap();
    path
}

/// Token store section for a SQLite database inside `dir`.
fn sqlite_section(dir: &Path) -> String {
    format!("[token_store]\ntype = \"sqlite\"\npath = \"{}\"\n", dir.join("tokens.sqlite").display())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies nested subcommands and positional arguments parse.
#[test]
fn parses_token_lookup() {
    let cli = Cli::try_parse_from([
        "survey-gate",
        "token",
        "lookup",
        "42",
        "ada@example.org",
        "--config",
        "gate.toml",
    ])
    .unwrap();
    match cli.command {
        Commands::Token {
            command: TokenCommand::Lookup(command),
        } => {
            assert_eq!(command.survey_id, "42");
            assert_eq!(command.email, "ada@example.org");
            assert_eq!(command.config.config, Some(PathBuf::from("gate.toml")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

/// Verifies `config example` parses without a config path.
#[test]
fn parses_config_example() {
    let cli = Cli::try_parse_from(["survey-gate", "config", "example"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommand::Example
        }
    ));
}

/// Verifies validation accepts a consistent config.
#[test]
fn config_validate_accepts_consistent_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "", "cs");
    let code = command_config_validate(&ConfigArgs {
        config: Some(path),
    })
    .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

/// Verifies validation reports a requirement outside the catalog.
#[test]
fn config_validate_rejects_unknown_option() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "", "biology");
    let config = load_config(Some(&path)).unwrap();
    let err = check_surveys(&config).unwrap_err();
    assert!(err.to_string().contains("biology"));
}

/// Verifies token lookup refuses the in-memory store.
#[test]
fn token_lookup_requires_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "", "cs");
    let err = command_token_lookup(&TokenLookupCommand {
        survey_id: "42".to_string(),
        email: "ada@example.org".to_string(),
        config: ConfigArgs {
            config: Some(path),
        },
    })
    .unwrap_err();
    assert!(err.to_string().contains("sqlite"));
}

/// Verifies activation prepares storage and lookup finds an issued token.
#[test]
fn activate_then_lookup_issued_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &sqlite_section(dir.path()), "cs");
    let activate = SurveyActivateCommand {
        survey_id: "42".to_string(),
        config: ConfigArgs {
            config: Some(path.clone()),
        },
    };
    assert_eq!(command_survey_activate(&activate).unwrap(), ExitCode::SUCCESS);

    let lookup = TokenLookupCommand {
        survey_id: "42".to_string(),
        email: "ada@example.org".to_string(),
        config: ConfigArgs {
            config: Some(path.clone()),
        },
    };
    assert_eq!(command_token_lookup(&lookup).unwrap(), ExitCode::FAILURE);

    let config = load_config(Some(&path)).unwrap();
    let store = build_token_store(&config.token_store).unwrap();
    let manager = ParticipantTokenManager::new(store, RandomTokenGenerator::default());
    let attributes = IdentityAttributes::new().with("mail", ["ada@example.org"]);
    let identity =
        ParticipantIdentity::from_attributes(&attributes, &IdentityMapping::default(), None);
    manager
        .obtain_token(TokenRequest {
            survey_id: &SurveyId::new("42"),
            identity: &identity,
            schedule: &SurveySchedule::default(),
            already_carrying_token: false,
        })
        .unwrap();
    assert_eq!(command_token_lookup(&lookup).unwrap(), ExitCode::SUCCESS);
}
