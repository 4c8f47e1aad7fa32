//! # frametest-server
//!
//! Orchestration server for frametest runs.
//!
//! - [`server`] - HTTP routes: shell page, runtime script, theme and compiled
//!   assets, result reporting and the final verdict
//! - [`push`] - websocket push channel for reloads and compile errors
//! - [`registry`] - the latest compile output or compile error
//! - [`session`] / [`identity`] - per-client result storage
//! - [`compiler`] - the compilation seam and a prebuilt-manifest compiler
//! - [`discovery`] - test file discovery
//! - [`browser`] - the browser seam
//! - [`orchestrator`] - ties it together for one run
//!
//! # Example
//!
//! ```rust,no_run
//! use frametest_server::{Orchestrator, PrebuiltManifestCompiler, ServerSettings};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), frametest_server::OrchestratorError> {
//! let compiler = Arc::new(PrebuiltManifestCompiler::new("dist/frametest-manifest.json"));
//! let orchestrator = Orchestrator::new(ServerSettings::default(), String::new(), compiler);
//! let status = orchestrator.run(vec!["src/a.test.ts".into()]).await?;
//! std::process::exit(status.code());
//! # }
//! ```

pub mod browser;
pub mod compiler;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod push;
pub mod registry;
pub mod server;
pub mod session;
pub mod shell;
pub mod state;

pub use browser::{BoxError, BrowserLauncher, ManagedBrowser};
pub use compiler::{
    CompileFailure, CompileOutcome, CompileRequest, CompileSink, Compiler,
    PrebuiltManifestCompiler,
};
pub use discovery::{discover, DiscoveryError, DiscoveryOptions};
pub use error::{OrchestratorError, ServerError};
pub use identity::IdentityMode;
pub use orchestrator::{load_runtime_script, shutdown_signal, Orchestrator};
pub use state::{RunMode, ServerEvent, ServerSettings, ServerState, SharedState, ThemePaths};
