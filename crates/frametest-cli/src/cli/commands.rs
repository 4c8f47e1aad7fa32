use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every test file once and exit with the verdict
    ///
    /// Exit status: 0 when every test passed, 1 when any failed or none ran,
    /// 2 when interrupted.
    Run(RunArgs),

    /// Serve tests and re-run them whenever the compiled output changes
    ///
    /// Runs until interrupted. Connected browsers reload on every successful
    /// rebuild and show the error on a failed one.
    Watch(RunArgs),
}

impl Command {
    pub fn args(&self) -> &RunArgs {
        match self {
            Self::Run(args) | Self::Watch(args) => args,
        }
    }
}

/// Overrides shared by `run` and `watch`.
///
/// Unset flags leave frametest.toml and `FRAMETEST_*` values in place.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// HTTP port for the test pages
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Websocket port for reload notifications (watch mode)
    #[arg(long, value_name = "PORT")]
    pub push_port: Option<u16>,

    /// Interface to listen on
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Compiled-output manifest written by the bundler
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Driver bundle served at /runtime-script
    #[arg(long, value_name = "PATH")]
    pub runtime_script: Option<PathBuf>,

    /// Per-test timeout in milliseconds (0 disables)
    #[arg(long, value_name = "MS")]
    pub test_timeout_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}
