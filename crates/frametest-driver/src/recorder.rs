//! Per-test result recording.

use crate::body::TestFailure;
use frametest_core::{LogEntry, TestResult};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the result of the test currently running.
///
/// Test bodies hold clones of it. Once [`TestRecorder::finish`] has run, the
/// result is frozen: late logs from a test that timed out are dropped.
#[derive(Debug, Clone)]
pub struct TestRecorder {
    result: Rc<RefCell<TestResult>>,
}

impl TestRecorder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            result: Rc::new(RefCell::new(TestResult::pending(name))),
        }
    }

    pub fn name(&self) -> String {
        self.result.borrow().name.clone()
    }

    pub fn has_run(&self) -> bool {
        self.result.borrow().has_run
    }

    pub fn log(&self, args: Vec<Value>) {
        self.update(|result| result.log_list.push(LogEntry::log(args)));
    }

    /// Logs at error level and fails the test.
    pub fn error(&self, args: Vec<Value>) {
        self.update(|result| {
            result.log_list.push(LogEntry::error(args));
            result.has_failed = true;
        });
    }

    pub fn fail(&self) {
        self.update(|result| result.has_failed = true);
    }

    pub fn skip(&self) {
        self.update(|result| result.is_skipped = true);
    }

    /// Marks the test as run. A failure becomes an exceptional error with the
    /// failure text appended to the log.
    pub fn finish(&self, outcome: Result<(), TestFailure>) {
        self.update(|result| {
            if let Err(failure) = outcome {
                result.has_exceptional_error = true;
                result.has_failed = true;
                result.log_list.push(LogEntry::error(failure.log_args()));
            }
            result.has_run = true;
        });
    }

    pub fn snapshot(&self) -> TestResult {
        self.result.borrow().clone()
    }

    fn update(&self, f: impl FnOnce(&mut TestResult)) {
        let mut result = self.result.borrow_mut();
        if !result.has_run {
            f(&mut result);
        }
    }
}
