//! frametest command-line runner.
//!
//! - [`cli`] - argument definitions
//! - [`config`] - frametest.toml, `FRAMETEST_*` and flag merging
//! - [`commands`] - the `run` / `watch` lifecycle
//! - [`error`] - error types and their miette rendering
//! - [`logger`] - tracing setup

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;

pub use error::{CliError, ConfigError, Result};
