//! Error types for the managed browser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// Chrome is missing, not executable, or exited during startup
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BrowserError>;
