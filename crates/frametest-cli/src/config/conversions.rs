//! Views of the config for the crates that do the work.

use crate::config::FrametestConfig;
use crate::error::ConfigError;
use frametest_browser::ChromeConfig;
use frametest_server::{DiscoveryOptions, RunMode, ServerSettings, ThemePaths};

impl FrametestConfig {
    pub fn server_settings(&self, mode: RunMode) -> ServerSettings {
        ServerSettings {
            host: self.host.clone(),
            port: self.port,
            push_port: self.push_port,
            mode,
            theme: ThemePaths {
                script: self.theme.script.clone(),
                style: self.theme.style.clone(),
            },
            test_timeout_ms: self.test_timeout_ms,
            identity: self.session_identity,
        }
    }

    /// # Errors
    ///
    /// `InvalidValue` if `testRegex` does not compile.
    pub fn discovery_options(&self) -> Result<DiscoveryOptions, ConfigError> {
        Ok(DiscoveryOptions {
            test_regex: self.test_regex()?,
            file_extensions: self.file_extensions.clone(),
            ignore_directories: self.ignore_directories.clone(),
        })
    }

    pub fn chrome_config(&self) -> ChromeConfig {
        let mut config = ChromeConfig::new().with_args(self.browser.args.iter().cloned());
        if !self.browser.headless {
            config = config.visible();
        }
        if let Some(path) = &self.browser.chrome_path {
            config = config.with_chrome_path(path);
        }
        config
    }
}
