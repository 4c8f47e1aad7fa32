//! Per-client result sessions.
//!
//! A session is created lazily the first time an identity is seen and lives
//! for the rest of the process. Results are keyed by test name; each one also
//! remembers the test file it was posted under so an aggregate post can
//! replace exactly that file's results.

use frametest_core::{TestResult, Verdict};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
struct RecordedResult {
    file_id: String,
    result: TestResult,
}

/// Results collected from one client.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    session_id: String,
    results: BTreeMap<String, RecordedResult>,
}

impl Session {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            results: BTreeMap::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Stores a single result; last write wins per test name.
    pub fn record(&mut self, file_id: &str, result: TestResult) {
        self.results.insert(
            result.name.clone(),
            RecordedResult {
                file_id: file_id.to_string(),
                result,
            },
        );
    }

    /// Drops every result posted under `file_id`, then stores `results`.
    pub fn replace_file(&mut self, file_id: &str, results: Vec<TestResult>) {
        self.results.retain(|_, recorded| recorded.file_id != file_id);
        for result in results {
            self.record(file_id, result);
        }
    }

    pub fn get(&self, name: &str) -> Option<&TestResult> {
        self.results.get(name).map(|recorded| &recorded.result)
    }

    pub fn results(&self) -> impl Iterator<Item = &TestResult> {
        self.results.values().map(|recorded| &recorded.result)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::tally(self.results())
    }
}

/// All sessions known to the server.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the session if this id has not been seen yet.
    pub fn ensure(&self, session_id: &str) {
        if self.sessions.read().contains_key(session_id) {
            return;
        }
        self.sessions
            .write()
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id));
    }

    /// Runs `f` against the session, creating it first if needed.
    pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.sessions.write();
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id));
        f(session)
    }

    /// A copy of the session, if it exists.
    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().get(session_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
