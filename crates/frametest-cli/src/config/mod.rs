//! Configuration, merged from several sources.
//!
//! Priority: CLI flags > `FRAMETEST_*` environment > frametest.toml > defaults
//!
//! ```toml
//! port = 9615
//! testRegex = '\.test\.tsx?$'
//! manifest = "dist/frametest-manifest.json"
//! runtimeScript = "node_modules/frametest/dist/runtime.js"
//!
//! [theme]
//! script = "theme/theme.js"
//! style = "theme/theme.css"
//!
//! [browser]
//! headless = true
//! ```
//!
//! Nested keys come from the environment with a double underscore:
//! `FRAMETEST_BROWSER__CHROME_PATH=/usr/bin/chromium`.

mod conversions;
mod defaults;
mod loading;
mod tests;
mod validation;

use frametest_server::IdentityMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;
pub use loading::CONFIG_FILE;
pub use validation::validate_extension;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FrametestConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Websocket push channel, watch mode only
    #[serde(default = "default_push_port")]
    pub push_port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Matched against `/`-separated paths relative to the working directory
    #[serde(default = "default_test_regex")]
    pub test_regex: String,

    /// Without the leading `.`
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,

    #[serde(default = "default_ignore_directories")]
    pub ignore_directories: Vec<String>,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default = "default_runtime_script")]
    pub runtime_script: PathBuf,

    /// Output manifest of the external bundler
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// 0 disables the per-test timeout
    #[serde(default = "default_test_timeout_ms")]
    pub test_timeout_ms: u64,

    #[serde(default)]
    pub session_identity: IdentityMode,

    #[serde(default)]
    pub browser: BrowserSettings,
}

/// The two files a theme consists of, served under `/theme/`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BrowserSettings {
    /// Launch a managed Chrome at the entry URL
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// Appended to the default Chrome arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            headless: true,
            chrome_path: None,
            args: Vec::new(),
        }
    }
}

impl Default for FrametestConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            push_port: default_push_port(),
            host: default_host(),
            test_regex: default_test_regex(),
            file_extensions: default_file_extensions(),
            ignore_directories: default_ignore_directories(),
            theme: ThemeConfig::default(),
            runtime_script: default_runtime_script(),
            manifest: default_manifest(),
            test_timeout_ms: default_test_timeout_ms(),
            session_identity: IdentityMode::default(),
            browser: BrowserSettings::default(),
        }
    }
}
