//! Test outcomes and the session verdict.
//!
//! A [`TestResult`] is created when a test registers (`has_run == false`),
//! mutated while the test executes and then copied to the server. The server
//! only ever sees finished results, so validation here is about the presence
//! of the fields the verdict depends on.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a log line was informational or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Produced by `log`
    Log,
    /// Produced by `error`, which also fails the test
    Error,
}

/// One append-only log line captured while a test ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry kind, serialized as `type`
    #[serde(rename = "type")]
    pub kind: LogKind,
    /// Arbitrary JSON arguments, in call order
    #[serde(default)]
    pub args: Vec<Value>,
}

impl LogEntry {
    /// Creates an informational entry.
    pub fn log(args: Vec<Value>) -> Self {
        Self {
            kind: LogKind::Log,
            args,
        }
    }

    /// Creates an error entry.
    pub fn error(args: Vec<Value>) -> Self {
        Self {
            kind: LogKind::Error,
            args,
        }
    }
}

/// Outcome of a single named test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Unique within its test module
    pub name: String,
    pub has_run: bool,
    pub has_failed: bool,
    #[serde(default)]
    pub has_exceptional_error: bool,
    #[serde(default)]
    pub is_skipped: bool,
    #[serde(default)]
    pub log_list: Vec<LogEntry>,
}

impl TestResult {
    /// A freshly registered test that has not run yet.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_run: false,
            has_failed: false,
            has_exceptional_error: false,
            is_skipped: false,
            log_list: Vec::new(),
        }
    }

    /// Parses a posted result body.
    ///
    /// # Errors
    ///
    /// `MalformedJson` if the body is not JSON, `MissingField` if `name`,
    /// `hasRun` or `hasFailed` is absent, `InvalidPayload` for wrong types.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(CoreError::MalformedJson)?;
        Self::from_value(value)
    }

    /// Validates and converts an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`TestResult::from_json`].
    pub fn from_value(value: Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(CoreError::InvalidPayload(
                "Unable to parse request. Expected JSON object.".to_string(),
            ));
        };

        let has_name = object
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty());
        if !has_name {
            return Err(CoreError::MissingField("name"));
        }
        for field in ["hasRun", "hasFailed"] {
            if object.get(field).is_none_or(Value::is_null) {
                return Err(CoreError::MissingField(field));
            }
        }

        serde_json::from_value(value).map_err(|e| CoreError::InvalidPayload(e.to_string()))
    }
}

/// Aggregate payload posted once a whole module has finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultBatch {
    pub test_result_list: Vec<TestResult>,
}

impl TestResultBatch {
    /// Parses an aggregate body, validating every entry.
    ///
    /// A single invalid entry rejects the whole batch.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`TestResult::from_json`].
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(CoreError::MalformedJson)?;
        let list = value
            .get("testResultList")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                CoreError::InvalidPayload(
                    "Expected an object with a \"testResultList\" array.".to_string(),
                )
            })?;

        let test_result_list = list
            .iter()
            .cloned()
            .map(TestResult::from_value)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { test_result_list })
    }
}

/// Pass/fail summary over a set of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verdict {
    pub total: usize,
    pub failed: usize,
}

impl Verdict {
    /// Tallies the given results.
    pub fn tally<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> Self {
        results.into_iter().fold(Self::default(), |mut verdict, result| {
            verdict.total += 1;
            if result.has_failed {
                verdict.failed += 1;
            }
            verdict
        })
    }

    /// At least one result and none failed.
    pub fn is_pass(&self) -> bool {
        self.total > 0 && self.failed == 0
    }
}
