//! Driver error types.
//!
//! [`HostError`] covers failures of the environment (DOM, theme, network);
//! [`DriverError`] covers everything that halts the driver. Failures inside a
//! single test body are not errors at this level: they are recorded on that
//! test's result as a [`TestFailure`](crate::body::TestFailure).

use thiserror::Error;

/// Failure reported by a [`DriverHost`](crate::host::DriverHost).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{0}")]
    Dom(String),

    #[error("No registered theme found on window.{0}. Unable to render anything.")]
    MissingTheme(&'static str),

    #[error("Theme callback {callback} failed: {message}")]
    Theme {
        callback: &'static str,
        message: String,
    },

    #[error("Failed to load asset {0}")]
    AssetLoad(String),

    #[error(
        "Cannot find the test module for {0}. This indicates that your test code most likely had uncaught errors. Check the console log."
    )]
    MissingModule(String),

    #[error("Invalid test module for {file}: {message}")]
    InvalidModule { file: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// The page was halted by a push-channel error; carries the shown text
    #[error("{0}")]
    Halted(String),
}

/// Anything that stops the driver and replaces the page with an error.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Unable to find test file: {0}")]
    UnknownTestFile(String),

    #[error("Unhandled route: {0}")]
    UnhandledRoute(String),

    #[error("Unable to handle file type: {0}")]
    UnsupportedAsset(String),

    #[error("Cannot have multiple beforeEach() calls in a test.")]
    DuplicateBeforeEach,

    #[error("Failed to post all test results for {file}: {message}")]
    Report { file: String, message: String },

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Failed to encode results: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DriverError {
    /// True if the page was halted from outside and already shows its error.
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Host(HostError::Halted(_)))
    }
}

/// Result alias for driver operations.
pub type Result<T, E = DriverError> = std::result::Result<T, E>;
