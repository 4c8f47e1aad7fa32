//! Process exit statuses.

use crate::result::Verdict;

/// How the orchestrator process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every test passed
    Success,
    /// A test failed, or nothing ran
    TestsFailed,
    /// Interrupted by SIGINT or SIGTERM
    Interrupted,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::TestsFailed => 1,
            Self::Interrupted => 2,
        }
    }
}

impl From<Verdict> for ExitStatus {
    fn from(verdict: Verdict) -> Self {
        if verdict.is_pass() {
            Self::Success
        } else {
            Self::TestsFailed
        }
    }
}
