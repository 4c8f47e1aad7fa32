//! Debounced watcher for the manifest file an external bundler writes.
//!
//! Bundlers often write the manifest in several steps (truncate, write,
//! rename). The parent directory is watched rather than the file itself so a
//! replaced file keeps producing events. Debouncing is on the trailing edge:
//! a change is reported only once the file has been quiet for the debounce
//! window, so the last write of a burst is the one that gets read.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Keeps the underlying watcher alive; dropping it stops notifications.
pub struct ManifestWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ManifestWatcher {
    /// Starts watching `path`.
    ///
    /// # Errors
    ///
    /// Returns the notify error if the watcher cannot be created or the
    /// parent directory cannot be watched.
    pub fn new(path: PathBuf, debounce: Duration) -> notify::Result<(Self, ManifestChanges)> {
        let (tx, rx) = mpsc::channel(16);
        let target = path.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            if !is_content_change(&event.kind) {
                return;
            }
            if !event.paths.iter().any(|p| same_file(p, &target)) {
                return;
            }

            // Full queue means a reload is already pending
            let _ = tx.try_send(());
        })?;

        watcher.watch(watch_root(&path), RecursiveMode::NonRecursive)?;

        Ok((
            Self {
                _watcher: watcher,
                path,
            },
            ManifestChanges { rx, debounce },
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Settled change notifications from a [`ManifestWatcher`].
pub struct ManifestChanges {
    rx: mpsc::Receiver<()>,
    debounce: Duration,
}

impl ManifestChanges {
    /// Waits for a change, then for the file to stay quiet for the debounce
    /// window. `None` once the watcher is gone.
    pub async fn next(&mut self) -> Option<()> {
        self.rx.recv().await?;
        loop {
            tokio::time::sleep(self.debounce).await;
            let mut pending = false;
            while self.rx.try_recv().is_ok() {
                pending = true;
            }
            if !pending {
                return Some(());
            }
        }
    }

    #[cfg(test)]
    fn from_channel(rx: mpsc::Receiver<()>, debounce: Duration) -> Self {
        Self { rx, debounce }
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

fn watch_root(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn same_file(candidate: &Path, target: &Path) -> bool {
    if candidate == target {
        return true;
    }
    // Events carry absolute paths; the target may be relative
    candidate.file_name() == target.file_name()
        && candidate.parent().map(Path::canonicalize).and_then(Result::ok)
            == watch_root(target).canonicalize().ok()
}
