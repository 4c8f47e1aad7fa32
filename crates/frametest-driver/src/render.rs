//! What the driver hands the theme.

use frametest_core::{Manifest, TestResult};
use serde::Serialize;

/// Per-test render state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestState {
    Waiting,
    Pass,
    Fail,
    Error,
    Skip,
}

impl TestState {
    pub fn of(result: &TestResult) -> Self {
        if result.is_skipped {
            Self::Skip
        } else if !result.has_run {
            Self::Waiting
        } else if result.has_exceptional_error {
            Self::Error
        } else if result.has_failed {
            Self::Fail
        } else {
            Self::Pass
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeTest {
    pub name: String,
    pub state: TestState,
}

/// Argument of the theme's `onTest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPageSettings {
    pub in_file: String,
    pub tests: Vec<ThemeTest>,
}

impl TestPageSettings {
    pub fn new(in_file: impl Into<String>, results: &[TestResult]) -> Self {
        Self {
            in_file: in_file.into(),
            tests: results
                .iter()
                .map(|result| ThemeTest {
                    name: result.name.clone(),
                    state: TestState::of(result),
                })
                .collect(),
        }
    }
}

/// Argument of the theme's `onHomePage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePageSettings<'a> {
    pub test_cases: &'a Manifest,
}
