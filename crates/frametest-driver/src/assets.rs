//! Compiled assets injected into the sandbox frame.

use crate::error::{DriverError, Result};
use frametest_core::route::compiled_asset_url;
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Sandbox tokens of the frame test code runs in.
pub const SANDBOX_TOKENS: &str = "allow-forms allow-modals allow-orientation-lock allow-pointer-lock allow-popups allow-presentation allow-same-origin allow-scripts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// `<script>` in the frame body
    Script,
    /// `<link rel="stylesheet">` in the frame head
    Stylesheet,
}

/// One asset, resolved to the URL the server serves it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub url: String,
    pub kind: AssetKind,
}

impl Asset {
    /// # Errors
    ///
    /// `UnsupportedAsset` for anything but `.js` and `.css`.
    pub fn classify(path: &str) -> Result<Self> {
        let kind = if path.ends_with(".js") {
            AssetKind::Script
        } else if path.ends_with(".css") {
            AssetKind::Stylesheet
        } else {
            return Err(DriverError::UnsupportedAsset(path.to_string()));
        };
        Ok(Self {
            url: compiled_asset_url(path),
            kind,
        })
    }
}

/// Counts down asset load events; settles once every asset has loaded or
/// the first one has failed.
#[derive(Debug)]
pub struct LoadCounter {
    remaining: Cell<usize>,
    settled: RefCell<Option<oneshot::Sender<Result<(), String>>>>,
}

impl LoadCounter {
    /// Returns the counter and the receiver that settles with it. The error
    /// side carries the URL that failed to load.
    pub fn new(total: usize) -> (Rc<Self>, oneshot::Receiver<Result<(), String>>) {
        let (tx, rx) = oneshot::channel();
        let counter = Rc::new(Self {
            remaining: Cell::new(total),
            settled: RefCell::new(Some(tx)),
        });
        if total == 0 {
            counter.settle(Ok(()));
        }
        (counter, rx)
    }

    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    pub fn loaded(&self) {
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        if remaining == 0 {
            self.settle(Ok(()));
        }
    }

    pub fn failed(&self, url: &str) {
        self.settle(Err(url.to_string()));
    }

    fn settle(&self, outcome: Result<(), String>) {
        if let Some(tx) = self.settled.borrow_mut().take() {
            let _ = tx.send(outcome);
        }
    }
}
