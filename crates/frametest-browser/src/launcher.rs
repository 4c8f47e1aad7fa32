//! Launching and tearing down the managed Chrome.

use crate::config::ChromeConfig;
use crate::console::parse_console_event;
use crate::error::{BrowserError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::page::Page;
use frametest_server::{BoxError, BrowserLauncher, ManagedBrowser};
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Launches Chrome through chromiumoxide.
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    config: ChromeConfig,
}

impl ChromeLauncher {
    pub fn new(config: ChromeConfig) -> Self {
        Self { config }
    }

    /// Starts Chrome with a fresh profile and opens `url` in one tab whose
    /// console is forwarded to tracing.
    ///
    /// # Errors
    ///
    /// `LaunchFailed` if Chrome cannot start, `NavigationFailed` if the page
    /// cannot be opened.
    pub async fn open(&self, url: &str) -> Result<ChromeBrowser> {
        let profile_dir =
            std::env::temp_dir().join(format!("frametest-chrome-{}", uuid::Uuid::new_v4()));
        let browser_config = self.config.to_browser_config(&profile_dir)?;
        debug!("Launching Chrome with {:?}", self.config);

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only processes CDP traffic while the handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        let mut chrome = ChromeBrowser {
            browser,
            handler_task,
            console_task: None,
            profile_dir,
        };

        // Listen before navigating so the first page's output is captured
        let page = match chrome.browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let err = BrowserError::ConnectionFailed(e.to_string());
                chrome.shutdown().await;
                return Err(err);
            }
        };
        chrome.console_task = Some(forward_console(&page).await);

        if let Err(e) = page.goto(url).await {
            chrome.shutdown().await;
            return Err(BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            });
        }

        debug!("Chrome opened {}", url);
        Ok(chrome)
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, url: &str) -> std::result::Result<Box<dyn ManagedBrowser>, BoxError> {
        let browser = self.open(url).await?;
        Ok(Box::new(browser))
    }
}

async fn forward_console(page: &Page) -> JoinHandle<()> {
    let events = page.event_listener::<EventConsoleApiCalled>().await;
    tokio::spawn(async move {
        match events {
            Ok(mut events) => {
                while let Some(event) = events.next().await {
                    parse_console_event(&event).forward();
                }
            }
            Err(e) => warn!("Page console is not available: {}", e),
        }
    })
}

/// A running Chrome owned by the orchestrator.
pub struct ChromeBrowser {
    browser: Browser,
    handler_task: JoinHandle<()>,
    console_task: Option<JoinHandle<()>>,
    profile_dir: PathBuf,
}

impl ChromeBrowser {
    /// Closes Chrome gracefully, killing the process if that fails.
    ///
    /// # Errors
    ///
    /// Returns the CDP error if the close command failed; the process has
    /// been killed regardless.
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if closed.is_err() {
            if let Some(Err(e)) = self.browser.kill().await {
                warn!("Failed to kill Chrome: {}", e);
            }
        } else if let Err(e) = self.browser.wait().await {
            debug!("Failed to reap Chrome: {}", e);
        }
        self.cleanup();
        closed.map(|_| ()).map_err(BrowserError::from)
    }

    async fn shutdown(mut self) {
        if let Some(Err(e)) = self.browser.kill().await {
            warn!("Failed to kill Chrome: {}", e);
        }
        self.cleanup();
    }

    fn cleanup(&mut self) {
        self.handler_task.abort();
        if let Some(task) = self.console_task.take() {
            task.abort();
        }
        if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
            debug!(
                "Failed to remove Chrome profile {}: {}",
                self.profile_dir.display(),
                e
            );
        }
    }
}

#[async_trait]
impl ManagedBrowser for ChromeBrowser {
    async fn close(self: Box<Self>) -> std::result::Result<(), BoxError> {
        ChromeBrowser::close(*self).await?;
        Ok(())
    }
}
