//! The compiler seam.
//!
//! Turning test sources into loadable assets is somebody else's job. A
//! [`Compiler`] is started once with the discovered test files and reports
//! through a [`CompileSink`]: at least once, and again after every rebuild in
//! watch mode.

mod prebuilt;
mod watcher;

pub use prebuilt::PrebuiltManifestCompiler;
pub use watcher::{ManifestChanges, ManifestWatcher};

use async_trait::async_trait;
use frametest_core::{CompileOutput, SerializedError};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

/// What the compiler is asked to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub test_files: Vec<String>,
    pub watch: bool,
}

/// A failed compilation, in a shape that can be shown to the browser.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{name}: {message}")]
pub struct CompileFailure {
    pub name: String,
    pub message: String,
    pub stack: String,
    pub extra: Map<String, Value>,
}

impl CompileFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "CompileError".to_string(),
            message: message.into(),
            stack: String::new(),
            extra: Map::new(),
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    pub fn to_serialized(&self) -> SerializedError {
        SerializedError {
            name: self.name.clone(),
            message: self.message.clone(),
            stack: self.stack.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl From<SerializedError> for CompileFailure {
    fn from(error: SerializedError) -> Self {
        Self {
            name: error.name,
            message: error.message,
            stack: error.stack,
            extra: error.extra,
        }
    }
}

/// One report from the compiler.
pub type CompileOutcome = Result<CompileOutput, CompileFailure>;

/// Where a compiler sends its reports.
#[derive(Debug, Clone)]
pub struct CompileSink {
    tx: mpsc::UnboundedSender<CompileOutcome>,
}

impl CompileSink {
    /// Creates a sink and the receiver the orchestrator reads from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CompileOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Sends a report. Returns `false` once nobody is listening any more.
    pub fn report(&self, outcome: CompileOutcome) -> bool {
        self.tx.send(outcome).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Produces compiled test output for the orchestrator.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Starts compiling. Reports arrive on `sink`; in watch mode the compiler
    /// keeps reporting until the sink closes.
    ///
    /// # Errors
    ///
    /// Returns a failure only if the compiler could not start at all.
    async fn start(&self, request: CompileRequest, sink: CompileSink) -> Result<(), CompileFailure>;
}
