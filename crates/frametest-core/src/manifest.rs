//! Compiled test outputs and the manifest built from them.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One compiled test file and the assets that implement it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledTestOutput {
    /// Source path of the test file; also its identity in routes
    pub in_file: String,
    /// Asset paths in load order
    pub assets: Vec<String>,
}

/// Ordered catalogue of compiled test files.
///
/// Replaced wholesale on every successful compilation; never patched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<CompiledTestOutput>,
}

impl Manifest {
    pub fn new(entries: Vec<CompiledTestOutput>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CompiledTestOutput] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CompiledTestOutput> {
        self.entries.get(index)
    }

    /// Index of the entry whose `in_file` matches exactly.
    pub fn position(&self, in_file: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.in_file == in_file)
    }

    /// The entry after `in_file`, or `None` if it is last or unknown.
    pub fn next_after(&self, in_file: &str) -> Option<&CompiledTestOutput> {
        self.position(in_file).and_then(|index| self.entries.get(index + 1))
    }

    /// True if `path` appears verbatim in any entry's asset list.
    ///
    /// This is the only access check for compiled asset reads, so it is a
    /// literal string comparison with no normalization.
    pub fn contains_asset(&self, path: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.assets.iter().any(|asset| asset == path))
    }
}

/// A successful compiler report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    pub test_file_output: Vec<CompiledTestOutput>,
}

impl CompileOutput {
    /// Validates raw compiler output.
    ///
    /// # Errors
    ///
    /// `InvalidPayload` if `testFileOutput` is missing, not an array, or
    /// holds malformed entries.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.get("testFileOutput").is_some_and(Value::is_array) {
            return Err(CoreError::InvalidPayload(
                "Compile output must carry a \"testFileOutput\" array.".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| CoreError::InvalidPayload(format!("Invalid compile output: {e}")))
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// `MalformedJson` for unparsable input, otherwise see [`CompileOutput::from_value`].
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(CoreError::MalformedJson)?;
        Self::from_value(value)
    }

    pub fn into_manifest(self) -> Manifest {
        Manifest::new(self.test_file_output)
    }
}
