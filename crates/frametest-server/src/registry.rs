//! Compiled-test registry.
//!
//! Holds the current manifest and the error from the latest compilation
//! attempt. A failed attempt keeps the previous manifest so a stale but
//! working catalogue continues to be served.

use frametest_core::{Manifest, SerializedError};
use parking_lot::RwLock;

/// Snapshot of the registry contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileState {
    /// `None` until the first successful compilation
    pub manifest: Option<Manifest>,
    /// Set only if the latest attempt failed
    pub last_error: Option<SerializedError>,
}

impl CompileState {
    pub fn has_compiled(&self) -> bool {
        self.manifest.is_some()
    }
}

/// Thread-safe, last-write-wins store for compile results.
#[derive(Debug, Default)]
pub struct CompileRegistry {
    state: RwLock<CompileState>,
}

impl CompileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the manifest wholesale and clears the error slot.
    pub fn record(&self, manifest: Manifest) {
        let mut state = self.state.write();
        state.manifest = Some(manifest);
        state.last_error = None;
    }

    /// Records a failed attempt; the previous manifest stays in place.
    pub fn record_error(&self, error: SerializedError) {
        self.state.write().last_error = Some(error);
    }

    /// Clears the error slot at the start of a compilation attempt.
    pub fn begin_attempt(&self) {
        self.state.write().last_error = None;
    }

    /// Manifest and error read under one lock.
    pub fn snapshot(&self) -> CompileState {
        self.state.read().clone()
    }

    /// True if `path` is an asset of the current manifest.
    pub fn contains_asset(&self, path: &str) -> bool {
        self.state
            .read()
            .manifest
            .as_ref()
            .is_some_and(|manifest| manifest.contains_asset(path))
    }
}
