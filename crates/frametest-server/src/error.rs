//! Error types for the orchestration server.
//!
//! Route handlers return [`ServerError`], which renders itself as a plain-text
//! response. Internal failures additionally carry a [`RouteFault`] extension so
//! the fault middleware can forward them to the orchestrator.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use frametest_core::CoreError;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors produced while handling a request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Client sent something the server refuses to act on; never mutates state
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure while serving a valid request
    #[error("{0}")]
    Internal(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Posted payload failed validation
    #[error(transparent)]
    Payload(#[from] CoreError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Payload(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Read { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Marker attached to 500 responses; picked up by the fault middleware.
#[derive(Debug, Clone)]
pub struct RouteFault(pub String);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        let mut response = (
            status,
            [(header::CONTENT_TYPE, "text/plain")],
            message.clone(),
        )
            .into_response();

        debug!("Request failed ({}): {}", status.as_u16(), message);
        if status.is_server_error() {
            response.extensions_mut().insert(RouteFault(message));
        }
        response
    }
}

/// Result alias for route handlers.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Errors that end an orchestration run early.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("Compiler error: {0}")]
    Compiler(String),

    #[error("Compiler stopped before reporting a first result")]
    CompilerStopped,

    #[error("Failed to launch browser: {0}")]
    Browser(String),

    #[error("Failed to load runtime script {}: {source}", .path.display())]
    RuntimeScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
