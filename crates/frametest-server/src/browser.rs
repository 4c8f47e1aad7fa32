//! The browser seam. The orchestrator launches one browser at the entry URL
//! and closes it exactly once during shutdown.

use async_trait::async_trait;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Starts a browser pointed at a URL.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, url: &str) -> Result<Box<dyn ManagedBrowser>, BoxError>;
}

/// A running browser owned by the orchestrator.
#[async_trait]
pub trait ManagedBrowser: Send {
    /// Terminates the browser process.
    async fn close(self: Box<Self>) -> Result<(), BoxError>;
}
