//! Data embedded in the shell page for the driver to pick up at start.

use crate::manifest::Manifest;
use crate::message::ErrorEnvelope;
use serde::{Deserialize, Serialize};

/// Global the shell page assigns the boot data to.
pub const BOOT_GLOBAL: &str = "__FRAMETEST__";

/// Global the runtime script exposes; the shell calls `start()` on it.
pub const RUNTIME_GLOBAL: &str = "frametestRuntime";

/// Global the theme registers its render callbacks on.
pub const THEME_GLOBAL: &str = "frametestTheme";

/// Default per-test timeout in milliseconds.
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 30_000;

/// What the driver knows before it runs anything.
///
/// Exactly one of `test_cases` / `compile_error` is meaningful: when a
/// compile error is present the driver renders it and halts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootData {
    #[serde(default)]
    pub test_cases: Manifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_error: Option<ErrorEnvelope>,
    /// Push channel port; absent outside watch mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_port: Option<u16>,
    /// `0` disables the per-test timeout
    #[serde(default = "default_timeout")]
    pub test_timeout_ms: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TEST_TIMEOUT_MS
}

impl BootData {
    /// Serializes for inline embedding in a `<script>` element.
    ///
    /// `</` is escaped so test names or error text cannot close the element.
    pub fn to_inline_script(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(json.replace("</", "<\\/"))
    }
}
