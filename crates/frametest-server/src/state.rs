//! Server settings and the shared state handed to every route.

use crate::identity::{IdentityMode, SessionIdentity};
use crate::push::PushHub;
use crate::registry::CompileRegistry;
use crate::session::SessionStore;
use frametest_core::boot::DEFAULT_TEST_TIMEOUT_MS;
use frametest_core::ExitStatus;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Whether the run ends after the first complete pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Run everything once and exit with the verdict
    #[default]
    OneShot,
    /// Keep serving and push reloads on every recompilation
    Watch,
}

impl RunMode {
    pub fn is_watch(self) -> bool {
        matches!(self, Self::Watch)
    }
}

/// Filesystem paths of the theme's two files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemePaths {
    pub script: String,
    pub style: String,
}

impl ThemePaths {
    /// The configured path `requested` names, if it names one of the two
    /// theme files.
    ///
    /// Leading slashes are ignored on both sides; nothing else is normalized.
    /// Callers read the returned path, never the request text, so an
    /// absolute theme path stays absolute.
    pub fn resolve(&self, requested: &str) -> Option<&str> {
        let requested = requested.trim_start_matches('/');
        [&self.script, &self.style]
            .into_iter()
            .find(|path| !path.is_empty() && path.trim_start_matches('/') == requested)
            .map(String::as_str)
    }

    /// True if `requested` names one of the two theme files.
    pub fn allows(&self, requested: &str) -> bool {
        self.resolve(requested).is_some()
    }
}

/// Everything the server needs to know about the run.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub push_port: u16,
    pub mode: RunMode,
    pub theme: ThemePaths,
    pub test_timeout_ms: u64,
    pub identity: IdentityMode,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9615,
            push_port: 9688,
            mode: RunMode::OneShot,
            theme: ThemePaths::default(),
            test_timeout_ms: DEFAULT_TEST_TIMEOUT_MS,
            identity: IdentityMode::Cookie,
        }
    }
}

/// Notifications from routes to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// `finishAllTests` ran in one-shot mode
    ExitRequested(ExitStatus),
    /// A route failed with a 500
    Fault(String),
}

/// Shared server state.
pub struct ServerState {
    pub registry: CompileRegistry,
    pub sessions: SessionStore,
    pub push: Arc<PushHub>,
    pub settings: ServerSettings,
    runtime_script: String,
    identity: Box<dyn SessionIdentity>,
    events: mpsc::UnboundedSender<ServerEvent>,
}

/// Shared state handle passed to axum.
pub type SharedState = Arc<ServerState>;

impl ServerState {
    /// Creates the state and the receiving end of its event channel.
    pub fn new(
        settings: ServerSettings,
        runtime_script: String,
    ) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let identity = settings.identity.strategy();
        let state = Self {
            registry: CompileRegistry::new(),
            sessions: SessionStore::new(),
            push: Arc::new(PushHub::new()),
            settings,
            runtime_script,
            identity,
            events,
        };
        (state, rx)
    }

    pub fn runtime_script(&self) -> &str {
        &self.runtime_script
    }

    pub fn identity(&self) -> &dyn SessionIdentity {
        self.identity.as_ref()
    }

    /// Asks the orchestrator to end the run.
    pub fn request_exit(&self, status: ExitStatus) {
        if self.events.send(ServerEvent::ExitRequested(status)).is_err() {
            debug!("Exit requested with no orchestrator listening");
        }
    }

    /// Forwards a route failure to the orchestrator.
    pub fn report_fault(&self, message: String) {
        if self.events.send(ServerEvent::Fault(message)).is_err() {
            debug!("Route fault with no orchestrator listening");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_allows_only_whitelisted_paths() {
        let theme = ThemePaths {
            script: "theme/main.js".into(),
            style: "/theme/main.css".into(),
        };
        assert!(theme.allows("theme/main.js"));
        assert!(theme.allows("/theme/main.js"));
        assert!(theme.allows("theme/main.css"));
        assert!(!theme.allows("theme/other.js"));
        assert!(!theme.allows("theme/../theme/main.js"));
    }

    #[test]
    fn test_theme_resolves_to_configured_path() {
        let theme = ThemePaths {
            script: "/opt/theme/main.js".into(),
            style: "theme/main.css".into(),
        };
        assert_eq!(theme.resolve("opt/theme/main.js"), Some("/opt/theme/main.js"));
        assert_eq!(theme.resolve("/theme/main.css"), Some("theme/main.css"));
        assert_eq!(theme.resolve("opt/theme/other.js"), None);
    }

    #[test]
    fn test_empty_theme_allows_nothing() {
        assert!(!ThemePaths::default().allows(""));
    }

    #[tokio::test]
    async fn test_events_reach_receiver() {
        let (state, mut rx) = ServerState::new(ServerSettings::default(), String::new());
        state.request_exit(ExitStatus::Success);
        state.report_fault("boom".into());

        assert_eq!(
            rx.recv().await,
            Some(ServerEvent::ExitRequested(ExitStatus::Success))
        );
        assert_eq!(rx.recv().await, Some(ServerEvent::Fault("boom".into())));
    }
}
