//! Launch options for the managed Chrome.

use crate::error::{BrowserError, Result};
use chromiumoxide::browser::BrowserConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeConfig {
    /// Run without a window (default: true, unless built with `visible`)
    pub headless: bool,

    pub window_size: (u32, u32),

    /// Extra Chrome arguments, appended after the defaults
    pub args: Vec<String>,

    /// Chrome executable (None = auto-detect)
    pub chrome_path: Option<PathBuf>,
}

impl ChromeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    #[must_use]
    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Command-line arguments for a launch using `user_data_dir` as profile.
    pub fn launch_args(&self, user_data_dir: &Path) -> Vec<String> {
        let mut args = vec![
            format!("--window-size={},{}", self.window_size.0, self.window_size.1),
            // Separate profiles keep parallel runs out of Chrome's ProcessSingleton
            format!("--user-data-dir={}", user_data_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ];
        args.extend(self.args.iter().cloned());
        args
    }

    pub(crate) fn to_browser_config(&self, user_data_dir: &Path) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();
        if !self.headless {
            config = config.with_head();
        }
        for arg in self.launch_args(user_data_dir) {
            config = config.arg(arg);
        }
        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path);
        }

        config.build().map_err(|e| BrowserError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "visible"),
            window_size: (1280, 800),
            args: vec![
                // Needed where user namespaces are unavailable (containers, CI)
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}
