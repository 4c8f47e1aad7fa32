//! The driver state machine.
//!
//! Every page load re-enters the machine through [`DriverState::resume`],
//! keyed by the route in `location.hash` and the run-all flag in
//! `location.search`. Everything else the driver needs is in the boot data,
//! so a full reload is the only cancellation there is.

use crate::error::DriverError;
use frametest_core::{BootData, Route};

/// Where the driver is in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverState {
    /// Halted with this text in place of the page
    Error(String),
    /// Catalogue rendered, waiting for the user
    Home,
    /// Navigation to the test file at this manifest index was requested
    NavigateTest(usize),
    /// Loading the assets of the test file at this index
    RunningModule(usize),
    ExecutingTests(usize),
    /// Posting the aggregate for the test file at this index
    PostModuleComplete(usize),
    Advance(usize),
    /// Nothing left to do on this page
    Done,
}

impl DriverState {
    /// Decides what a freshly loaded page does.
    pub fn resume(boot: &BootData, route: &Route, run_all: bool) -> Self {
        if let Some(envelope) = &boot.compile_error {
            return Self::Error(envelope.message.display_text());
        }

        match route {
            Route::Home if run_all && !boot.test_cases.is_empty() => Self::NavigateTest(0),
            Route::Home => Self::Home,
            Route::Test { in_file } => match boot.test_cases.position(in_file) {
                Some(index) => Self::RunningModule(index),
                None => Self::Error(DriverError::UnknownTestFile(in_file.clone()).to_string()),
            },
            Route::Unknown(raw) => Self::Error(DriverError::UnhandledRoute(raw.clone()).to_string()),
        }
    }

    /// True once the driver will do nothing more without a reload.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Error(_) | Self::Home | Self::NavigateTest(_) | Self::Done
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frametest_core::{CompiledTestOutput, Manifest, SerializedError};

    fn boot(files: &[&str]) -> BootData {
        BootData {
            test_cases: Manifest::new(
                files
                    .iter()
                    .map(|f| CompiledTestOutput {
                        in_file: (*f).to_string(),
                        assets: vec![format!("{f}.js")],
                    })
                    .collect(),
            ),
            compile_error: None,
            push_port: None,
            test_timeout_ms: 0,
        }
    }

    #[test]
    fn test_compile_error_wins_over_route() {
        let mut boot = boot(&["a.test.ts"]);
        boot.compile_error =
            Some(SerializedError::new("SyntaxError", "Unexpected token").into());

        let state = DriverState::resume(&boot, &Route::Home, true);
        assert_eq!(
            state,
            DriverState::Error("SyntaxError: Unexpected token".into())
        );
    }

    #[test]
    fn test_home_with_run_all_navigates_to_first() {
        let boot = boot(&["a.test.ts", "b.test.ts"]);
        assert_eq!(
            DriverState::resume(&boot, &Route::Home, true),
            DriverState::NavigateTest(0)
        );
        assert_eq!(
            DriverState::resume(&boot, &Route::Home, false),
            DriverState::Home
        );
    }

    #[test]
    fn test_run_all_with_empty_catalogue_stays_home() {
        assert_eq!(
            DriverState::resume(&boot(&[]), &Route::Home, true),
            DriverState::Home
        );
    }

    #[test]
    fn test_test_route_resolves_index() {
        let boot = boot(&["a.test.ts", "b.test.ts"]);
        let route = Route::Test {
            in_file: "b.test.ts".into(),
        };
        assert_eq!(
            DriverState::resume(&boot, &route, false),
            DriverState::RunningModule(1)
        );
    }

    #[test]
    fn test_unknown_file_and_route_halt() {
        let boot = boot(&["a.test.ts"]);
        let route = Route::Test {
            in_file: "missing.test.ts".into(),
        };
        assert_eq!(
            DriverState::resume(&boot, &route, true),
            DriverState::Error("Unable to find test file: missing.test.ts".into())
        );
        assert_eq!(
            DriverState::resume(&boot, &Route::Unknown("#/nope".into()), false),
            DriverState::Error("Unhandled route: #/nope".into())
        );
    }
}
