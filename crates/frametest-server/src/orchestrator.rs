//! Run lifecycle: compile, serve, launch, wait for a verdict, shut down.
//!
//! 1. Start the compiler and wait for its first report
//! 2. Bind the HTTP listener (and the push listener in watch mode)
//! 3. Launch the browser at the entry URL
//! 4. Loop: apply compile reports, log route faults, wait for an exit
//!    request or a signal
//! 5. Close the listeners, kill the browser, return the exit status

use crate::browser::{BrowserLauncher, ManagedBrowser};
use crate::compiler::{CompileOutcome, CompileRequest, CompileSink, Compiler};
use crate::error::OrchestratorError;
use crate::push;
use crate::server::{self, RunningServer};
use crate::state::{ServerEvent, ServerSettings, ServerState, SharedState};
use frametest_core::route::entry_url;
use frametest_core::{ExitStatus, PushMessage};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Drives one frametest run.
pub struct Orchestrator {
    settings: ServerSettings,
    runtime_script: String,
    compiler: Arc<dyn Compiler>,
    launcher: Option<Arc<dyn BrowserLauncher>>,
}

impl Orchestrator {
    pub fn new(settings: ServerSettings, runtime_script: String, compiler: Arc<dyn Compiler>) -> Self {
        Self {
            settings,
            runtime_script,
            compiler,
            launcher: None,
        }
    }

    /// Launch a browser once the server is up. Without one, the entry URL is
    /// only logged.
    #[must_use]
    pub fn with_browser(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Runs until the verdict arrives (one-shot) or SIGINT/SIGTERM.
    ///
    /// # Errors
    ///
    /// Fails if the compiler cannot start, a listener cannot bind, or the
    /// browser cannot launch.
    pub async fn run(self, test_files: Vec<String>) -> Result<ExitStatus, OrchestratorError> {
        self.run_until(test_files, shutdown_signal()).await
    }

    /// Like [`Orchestrator::run`], with `interrupt` standing in for signals.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::run`].
    pub async fn run_until(
        self,
        test_files: Vec<String>,
        interrupt: impl Future<Output = ()>,
    ) -> Result<ExitStatus, OrchestratorError> {
        let watch = self.settings.mode.is_watch();
        let (state, mut events) = ServerState::new(self.settings.clone(), self.runtime_script);
        let state: SharedState = Arc::new(state);

        let (sink, mut outcomes) = CompileSink::channel();
        info!("Compiling {} test file(s)...", test_files.len());
        self.compiler
            .start(CompileRequest { test_files, watch }, sink)
            .await
            .map_err(|e| OrchestratorError::Compiler(e.to_string()))?;

        let first = outcomes
            .recv()
            .await
            .ok_or(OrchestratorError::CompilerStopped)?;
        if first.is_err() && !watch {
            apply_outcome(&state, first);
            return Ok(ExitStatus::TestsFailed);
        }
        apply_outcome(&state, first);

        let http_addr = resolve(&self.settings.host, self.settings.port).await?;
        let http = RunningServer::bind(http_addr, server::router(state.clone())).await?;
        info!("Serving tests at http://{}", http.local_addr());

        let push = if watch {
            let push_addr = resolve(&self.settings.host, self.settings.push_port).await?;
            match RunningServer::bind(push_addr, push::router(state.push.clone())).await {
                Ok(push) => {
                    debug!("Push channel listening on ws://{}", push.local_addr());
                    Some(push)
                }
                Err(e) => {
                    http.stop().await;
                    return Err(e);
                }
            }
        } else {
            None
        };

        let url = entry_url(&self.settings.host, http.local_addr().port(), !watch);
        let browser = match &self.launcher {
            Some(launcher) => match launcher.launch(&url).await {
                Ok(browser) => {
                    info!("Browser opened at {}", url);
                    Some(browser)
                }
                Err(e) => {
                    shutdown(&state, http, push, None).await;
                    return Err(OrchestratorError::Browser(e.to_string()));
                }
            },
            None => {
                info!("Open {} to run the tests", url);
                None
            }
        };

        tokio::pin!(interrupt);
        let mut compiler_open = true;
        let status = loop {
            tokio::select! {
                outcome = outcomes.recv(), if compiler_open => match outcome {
                    Some(outcome) => {
                        let message = apply_outcome(&state, outcome);
                        state.push.broadcast(&message);
                    }
                    None => {
                        debug!("Compiler stopped reporting");
                        compiler_open = false;
                    }
                },
                Some(event) = events.recv() => match event {
                    ServerEvent::ExitRequested(status) => break status,
                    ServerEvent::Fault(message) => error!("Route fault: {}", message),
                },
                () = &mut interrupt => {
                    info!("Interrupted, shutting down...");
                    break ExitStatus::Interrupted;
                }
            }
        };

        shutdown(&state, http, push, browser).await;
        Ok(status)
    }
}

/// Records a compile report and returns the message to broadcast.
fn apply_outcome(state: &ServerState, outcome: CompileOutcome) -> PushMessage {
    state.registry.begin_attempt();
    match outcome {
        Ok(output) => {
            info!("Compiled {} test file(s)", output.test_file_output.len());
            state.registry.record(output.into_manifest());
            PushMessage::Reload
        }
        Err(failure) => {
            error!("Compilation failed: {}", failure);
            let error = failure.to_serialized();
            state.registry.record_error(error.clone());
            PushMessage::error(error)
        }
    }
}

async fn shutdown(
    state: &ServerState,
    http: RunningServer,
    push: Option<RunningServer>,
    browser: Option<Box<dyn ManagedBrowser>>,
) {
    if tokio::time::timeout(SHUTDOWN_GRACE, http.stop()).await.is_err() {
        warn!("HTTP listener did not stop within {:?}", SHUTDOWN_GRACE);
    }

    state.push.close_all();
    if let Some(push) = push {
        if tokio::time::timeout(SHUTDOWN_GRACE, push.stop()).await.is_err() {
            warn!("Push listener did not stop within {:?}", SHUTDOWN_GRACE);
        }
    }

    if let Some(browser) = browser {
        match browser.close().await {
            Ok(()) => debug!("Browser closed"),
            Err(e) => warn!("Failed to close browser: {}", e),
        }
    }
}

/// Reads the driver bundle served at `/runtime-script`.
///
/// # Errors
///
/// `RuntimeScript` if the file cannot be read.
pub async fn load_runtime_script(path: &Path) -> Result<String, OrchestratorError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| OrchestratorError::RuntimeScript {
            path: path.to_path_buf(),
            source,
        })
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, OrchestratorError> {
    let invalid = || OrchestratorError::InvalidAddress(format!("{host}:{port}"));
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
