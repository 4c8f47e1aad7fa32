use frametest_core::boot::DEFAULT_TEST_TIMEOUT_MS;
use std::path::PathBuf;

pub fn default_port() -> u16 {
    9615
}

pub fn default_push_port() -> u16 {
    9688
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_test_regex() -> String {
    r"\.test\.tsx?$".to_string()
}

pub fn default_file_extensions() -> Vec<String> {
    ["js", "jsx", "ts", "tsx"].map(String::from).to_vec()
}

pub fn default_ignore_directories() -> Vec<String> {
    vec!["node_modules".to_string()]
}

pub fn default_runtime_script() -> PathBuf {
    PathBuf::from("node_modules/frametest/dist/runtime.js")
}

pub fn default_manifest() -> PathBuf {
    PathBuf::from("dist/frametest-manifest.json")
}

pub fn default_test_timeout_ms() -> u64 {
    DEFAULT_TEST_TIMEOUT_MS
}

pub(crate) fn default_true() -> bool {
    true
}
