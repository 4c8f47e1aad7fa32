//! The seam between the driver and the page it runs in.

use crate::assets::Asset;
use crate::error::HostError;
use crate::module::TestModule;
use crate::render::{HomePageSettings, TestPageSettings};
use async_trait::async_trait;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Warn,
    Error,
}

/// Everything the driver needs from its environment.
///
/// The browser implementation lives in `web`; tests drive the state machine
/// through an in-memory host. Futures are `?Send`: the driver runs on the
/// page's single thread.
#[async_trait(?Send)]
pub trait DriverHost {
    /// `location.hash`
    fn hash(&self) -> String;

    /// `location.search`
    fn search(&self) -> String;

    fn console(&self, level: ConsoleLevel, message: &str);

    /// Replaces the page with preformatted error text.
    fn render_error(&self, text: &str);

    /// # Errors
    ///
    /// Fails if no theme is registered or its callback throws.
    fn render_home(&self, settings: &HomePageSettings<'_>) -> Result<(), HostError>;

    /// # Errors
    ///
    /// Fails if no theme is registered or its callback throws.
    fn render_test(&self, settings: &TestPageSettings) -> Result<(), HostError>;

    /// Sets `location.hash`; the page reloads on the resulting hash change.
    ///
    /// # Errors
    ///
    /// Fails if the location cannot be changed.
    fn navigate(&self, hash: &str) -> Result<(), HostError>;

    /// Injects `assets` in order into a fresh sandbox frame, waits for all of
    /// them to load and returns the module the test file registered.
    ///
    /// # Errors
    ///
    /// Fails if an asset cannot load or no module was registered.
    async fn load_module(&self, in_file: &str, assets: &[Asset]) -> Result<TestModule, HostError>;

    /// POSTs `body` (JSON) to `url`.
    ///
    /// # Errors
    ///
    /// `Network` if no response arrived. Non-2xx responses are replies.
    async fn post(&self, url: &str, body: Option<String>) -> Result<HttpReply, HostError>;

    async fn sleep(&self, ms: u64);
}
