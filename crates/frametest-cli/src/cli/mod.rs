//! Command-line interface.
//!
//! - `frametest run` - one pass over every test file, exit code is the verdict
//! - `frametest watch` - keep serving and reload connected browsers whenever
//!   the compiled output changes

mod commands;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{Command, RunArgs};

/// frametest - run browser test modules in a real browser
#[derive(Parser, Debug)]
#[command(
    name = "frametest",
    version,
    about = "Run browser test modules in a real browser",
    long_about = "frametest serves compiled test modules to a browser, runs each one in an\n\
                  isolated frame and collects the results. `run` exits with the verdict;\n\
                  `watch` keeps serving and reloads the browser on every rebuild."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file (default: ./frametest.toml if present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not launch a browser; open the printed URL yourself
    #[arg(long, global = true)]
    pub no_browser: bool,

    #[command(subcommand)]
    pub command: Command,
}
