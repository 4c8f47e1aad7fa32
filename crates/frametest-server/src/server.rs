//! HTTP routes of the orchestration server.
//!
//! | Route | Purpose |
//! |---|---|
//! | `/` | shell page embedding the catalogue or the compile error |
//! | `/runtime-script` | driver bundle held in memory |
//! | `/theme/{path}` | the two whitelisted theme files |
//! | `/compiled-asset/{path}` | files listed in the current manifest |
//! | `/api/testResult/{file}` | one test result |
//! | `/api/testResultAll/{file}` | every result of one test file |
//! | `/api/finishAllTests` | verdict; ends one-shot runs |

use crate::error::{OrchestratorError, Result, RouteFault, ServerError};
use crate::identity::ClientSession;
use crate::shell;
use crate::state::SharedState;
use axum::{
    body::{Body, Bytes},
    extract::{Path, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use frametest_core::{ExitStatus, TestResult, TestResultBatch};
use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Builds the router with all routes, the fault middleware and panic capture.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", any(handle_shell))
        .route("/runtime-script", any(handle_runtime_script))
        .route("/theme/{*path}", any(handle_theme_asset))
        .route("/compiled-asset/{*path}", any(handle_compiled_asset))
        .route("/api/testResult/{*file_id}", any(handle_test_result))
        .route("/api/testResultAll/{*file_id}", any(handle_test_result_all))
        .route("/api/finishAllTests", any(handle_finish_all_tests))
        .fallback(handle_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(state.clone(), forward_faults))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn text(status: StatusCode, content_type: &'static str, body: impl Into<Body>) -> Response {
    (status, [(header::CONTENT_TYPE, content_type)], body.into()).into_response()
}

async fn handle_shell(State(state): State<SharedState>, session: ClientSession) -> Result<Response> {
    let compile_state = state.registry.snapshot();
    let html = shell::render(&compile_state, &state.settings)
        .map_err(|e| ServerError::Internal(format!("Failed to render shell page: {e}")))?;

    debug!("Serving shell page to session {}", session.session_id);
    Ok((session.jar, text(StatusCode::OK, "text/html", html)).into_response())
}

async fn handle_runtime_script(State(state): State<SharedState>) -> Response {
    text(
        StatusCode::OK,
        "application/javascript",
        state.runtime_script().to_string(),
    )
}

async fn handle_theme_asset(
    State(state): State<SharedState>,
    Path(path): Path<String>,
) -> Result<Response> {
    let theme = &state.settings.theme;
    let Some(configured) = theme.resolve(&path) else {
        return Err(ServerError::BadRequest(format!(
            "Invalid asset requested at: {}. Must be:\n-{}\n-{}",
            path, theme.script, theme.style
        )));
    };
    serve_file(PathBuf::from(configured)).await
}

async fn handle_compiled_asset(
    State(state): State<SharedState>,
    Path(path): Path<String>,
) -> Result<Response> {
    if !state.registry.contains_asset(&path) {
        return Err(ServerError::BadRequest(format!(
            "Invalid file requested: {path}. Only assets of the current compile output are served."
        )));
    }
    debug!("Serving compiled asset {}", path);
    serve_file(PathBuf::from(path)).await
}

async fn serve_file(path: PathBuf) -> Result<Response> {
    let content_type = match path.extension().and_then(|ext| ext.to_str()) {
        Some("js" | "mjs") => "application/javascript",
        Some("css") => "text/css",
        other => {
            return Err(ServerError::Internal(format!(
                "Unhandled file extension requested: {}",
                other.unwrap_or_default()
            )));
        }
    };

    let content = tokio::fs::read(&path)
        .await
        .map_err(|source| ServerError::Read { path, source })?;
    Ok(text(StatusCode::OK, content_type, content))
}

fn require_post(method: &Method) -> Result<()> {
    if method == Method::POST {
        Ok(())
    } else {
        Err(ServerError::BadRequest("Must use POST".to_string()))
    }
}

async fn handle_test_result(
    State(state): State<SharedState>,
    session: ClientSession,
    method: Method,
    Path(file_id): Path<String>,
    body: Bytes,
) -> Result<Response> {
    require_post(&method)?;
    let result = TestResult::from_json(&body)?;

    debug!(
        "Result for '{}' in {}: failed={}",
        result.name, file_id, result.has_failed
    );
    state
        .sessions
        .with_session(&session.session_id, |s| s.record(&file_id, result));

    Ok((session.jar, text(StatusCode::OK, "text/plain", "ok")).into_response())
}

async fn handle_test_result_all(
    State(state): State<SharedState>,
    session: ClientSession,
    method: Method,
    Path(file_id): Path<String>,
    body: Bytes,
) -> Result<Response> {
    require_post(&method)?;
    let batch = TestResultBatch::from_json(&body)?;

    let total = batch.test_result_list.len();
    let failed = batch
        .test_result_list
        .iter()
        .filter(|result| result.has_failed)
        .count();
    info!("{}: {} test(s), {} failed", file_id, total, failed);

    state.sessions.with_session(&session.session_id, |s| {
        s.replace_file(&file_id, batch.test_result_list)
    });

    Ok((session.jar, text(StatusCode::OK, "text/plain", "ok")).into_response())
}

async fn handle_finish_all_tests(
    State(state): State<SharedState>,
    session: ClientSession,
) -> Response {
    let verdict = state
        .sessions
        .get(&session.session_id)
        .map(|s| s.verdict())
        .unwrap_or_default();
    let status = ExitStatus::from(verdict);

    let response = if verdict.is_pass() {
        info!("Tests passed ({} total)", verdict.total);
        text(StatusCode::OK, "text/plain", "PASS")
    } else {
        info!(
            "Tests failed ({} of {} failed)",
            verdict.failed, verdict.total
        );
        text(StatusCode::INTERNAL_SERVER_ERROR, "text/plain", "FAIL")
    };

    if !state.settings.mode.is_watch() {
        state.request_exit(status);
    }
    (session.jar, response).into_response()
}

async fn handle_not_found() -> Response {
    text(StatusCode::NOT_FOUND, "text/plain", "Not Found")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    let mut response = text(
        StatusCode::INTERNAL_SERVER_ERROR,
        "text/plain",
        format!("Error: {detail}"),
    );
    response
        .extensions_mut()
        .insert(RouteFault(format!("Handler panicked: {detail}")));
    response
}

async fn forward_faults(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    if let Some(RouteFault(message)) = response.extensions().get::<RouteFault>() {
        state.report_fault(format!("{path}: {message}"));
    }
    response
}

/// A listener serving a router until told to stop.
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RunningServer {
    /// Binds `addr` and serves `app` in a background task.
    ///
    /// # Errors
    ///
    /// Returns `Bind` if the address cannot be bound.
    pub async fn bind(addr: SocketAddr, app: Router) -> Result<Self, OrchestratorError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| OrchestratorError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| OrchestratorError::Bind { addr, source })?;

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(serve(listener, app, async {
            let _ = rx.await;
        }));

        Ok(Self {
            local_addr,
            shutdown: Some(tx),
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!("Server task ended abnormally: {}", e);
        }
    }
}

async fn serve(listener: TcpListener, app: Router, shutdown: impl Future<Output = ()> + Send + 'static) {
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await;

    if let Err(e) = result {
        warn!("Server error: {}", e);
    }
}
