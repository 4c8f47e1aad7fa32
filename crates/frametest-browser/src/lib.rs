//! # frametest-browser
//!
//! Managed Chrome for frametest runs, built on chromiumoxide.
//!
//! [`ChromeLauncher`] implements the server's `BrowserLauncher` seam: it
//! starts Chrome with a throwaway profile, opens the entry URL in a single tab
//! and forwards that tab's console output to `tracing`. The returned
//! [`ChromeBrowser`] is closed once by the orchestrator during shutdown.
//!
//! ```no_run
//! use frametest_browser::{ChromeConfig, ChromeLauncher};
//! use std::sync::Arc;
//!
//! let launcher = Arc::new(ChromeLauncher::new(ChromeConfig::default()));
//! // orchestrator.with_browser(launcher)
//! # let _ = launcher;
//! ```
//!
//! Tests that need a real Chrome are `#[ignore]`d; run them with
//! `cargo test -p frametest-browser -- --ignored`.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod console;
pub mod error;
pub mod launcher;

pub use config::ChromeConfig;
pub use console::{ConsoleLevel, ConsoleMessage};
pub use error::{BrowserError, Result};
pub use launcher::{ChromeBrowser, ChromeLauncher};
