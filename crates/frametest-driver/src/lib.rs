//! # frametest-driver
//!
//! The browser-resident half of frametest. Each page load resumes the
//! [`DriverState`] machine from the URL, runs at most one test file inside a
//! sandboxed frame, reports every result to the server and then navigates to
//! the next test file (a fresh page load) or finishes the run.
//!
//! The machine itself is environment-agnostic: it talks to the page through
//! [`DriverHost`]. On `wasm32` the [`web`] module provides the browser host
//! and the `start` entry point the shell page calls.

pub mod assets;
pub mod body;
pub mod error;
pub mod host;
pub mod module;
pub mod push;
pub mod recorder;
pub mod render;
pub mod runner;
pub mod state;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use assets::{Asset, AssetKind};
pub use body::{Done, TestBody, TestFailure};
pub use error::{DriverError, HostError, Result};
pub use host::{ConsoleLevel, DriverHost, HttpReply};
pub use push::{HaltSignal, PushAction};
pub use module::{TestDescriptor, TestModule};
pub use recorder::TestRecorder;
pub use render::{HomePageSettings, TestPageSettings, TestState};
pub use runner::Driver;
pub use state::DriverState;
