//! Error types for the frametest CLI.
//!
//! [`CliError`] is what commands return; [`ConfigError`] covers everything
//! wrong with `frametest.toml`, the environment or the flags. Both render
//! with a hint where one helps. [`cli_error_to_miette`] turns them into the
//! report printed before exiting.

use frametest_server::{DiscoveryError, OrchestratorError};
use miette::Report;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems with the merged configuration. All are fatal before serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}\n\nHint: Create frametest.toml or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// The file, environment or flags could not be merged into a config
    #[error("{0}\n\nHint: Check frametest.toml syntax and FRAMETEST_* variables")]
    Invalid(String),

    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField { field: String, hint: String },

    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    #[error("Conflicting options: {0}")]
    ConflictingOptions(String),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Converts a CLI error into the report shown to the user.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Discovery(e @ DiscoveryError::NoTestFiles { .. }) => miette::miette!(
            help = "Adjust testRegex, fileExtensions or ignoreDirectories in frametest.toml",
            "{}",
            e
        ),
        CliError::Orchestrator(e @ OrchestratorError::Bind { .. }) => miette::miette!(
            help = "Another process may be using the port; set port/pushPort or FRAMETEST_PORT",
            "{}",
            e
        ),
        CliError::Orchestrator(e @ OrchestratorError::Browser(_)) => miette::miette!(
            help = "Install Chrome, set browser.chromePath, or run with --no-browser",
            "{}",
            e
        ),
        other => miette::miette!("{}", other),
    }
}
