use crate::cli::RunArgs;
use crate::config::FrametestConfig;
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Serialized, Toml},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "frametest.toml";

const ENV_PREFIX: &str = "FRAMETEST_";

/// Flag values that take precedence over every other source.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    push_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    runtime_script: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "BrowserOverrides::is_empty")]
    browser: BrowserOverrides,
}

#[derive(Debug, Default, Serialize)]
struct BrowserOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headless: Option<bool>,
}

impl BrowserOverrides {
    fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.headless.is_none()
    }
}

impl CliOverrides {
    pub(crate) fn new(args: &RunArgs, no_browser: bool) -> Self {
        Self {
            port: args.port,
            push_port: args.push_port,
            host: args.host.clone(),
            manifest: args.manifest.clone(),
            runtime_script: args.runtime_script.clone(),
            test_timeout_ms: args.test_timeout_ms,
            browser: BrowserOverrides {
                enabled: no_browser.then_some(false),
                headless: args.headed.then_some(false),
            },
        }
    }
}

impl FrametestConfig {
    /// Loads and validates the configuration for a run started in `cwd`.
    ///
    /// # Errors
    ///
    /// `NotFound` if an explicit config file is missing, `Invalid` if the
    /// sources cannot be merged, or any validation error.
    pub fn load(
        cwd: &Path,
        config_path: Option<&Path>,
        args: &RunArgs,
        no_browser: bool,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        match config_path {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = cwd.join(CONFIG_FILE);
                if default_path.is_file() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment = figment
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .lowercase(false)
                    .map(|key| env_key(key.as_str()).into()),
            )
            .merge(Serialized::defaults(CliOverrides::new(args, no_browser)));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// `BROWSER__CHROME_PATH` → `browser.chromePath`
pub(crate) fn env_key(raw: &str) -> String {
    raw.split("__")
        .map(camel_case)
        .collect::<Vec<_>>()
        .join(".")
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, word) in segment
        .split('_')
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        let word = word.to_ascii_lowercase();
        if i == 0 {
            out.push_str(&word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}
