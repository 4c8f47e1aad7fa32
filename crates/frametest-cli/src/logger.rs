//! Logging setup for the frametest CLI.
//!
//! Level selection, first match wins:
//! 1. `--verbose`: debug for frametest crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for frametest crates
//!
//! Page console output from the managed browser arrives under the
//! `frametest::browser` target.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE: &str =
    "frametest=debug,frametest_server=debug,frametest_browser=debug,frametest_cli=debug";
const QUIET: &str = "frametest=error,frametest_server=error,frametest_browser=error,frametest_cli=error";
const DEFAULT: &str =
    "frametest=info,frametest_server=info,frametest_browser=info,frametest_cli=info";

/// Installs the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = match flag_directives(verbose, quiet) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT)),
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(use_color(no_color))
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Directives forced by flags; `None` defers to `RUST_LOG`.
fn flag_directives(verbose: bool, quiet: bool) -> Option<&'static str> {
    if verbose {
        Some(VERBOSE)
    } else if quiet {
        Some(QUIET)
    } else {
        None
    }
}

/// `--no-color` and the `NO_COLOR` convention both disable ANSI output.
fn use_color(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none()
}
