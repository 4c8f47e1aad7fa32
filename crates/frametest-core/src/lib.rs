//! # frametest-core
//!
//! Wire model shared by the frametest orchestration server and the
//! browser-resident test driver.
//!
//! Everything in this crate crosses the HTTP or push-channel boundary at some
//! point, so the serde representations here *are* the protocol:
//!
//! - [`result`] - per-test outcomes, log entries and the pass/fail verdict
//! - [`manifest`] - compiled test files and the ordered catalogue of them
//! - [`message`] - push-channel notifications and serialized errors
//! - [`route`] - page routes, endpoint paths and the run-all flag
//! - [`boot`] - the data the shell page embeds for the driver
//! - [`exit`] - process exit statuses
//!
//! Builds for both native and `wasm32-unknown-unknown` targets.

pub mod boot;
pub mod error;
pub mod exit;
pub mod manifest;
pub mod message;
pub mod result;
pub mod route;

pub use boot::BootData;
pub use error::{CoreError, Result};
pub use exit::ExitStatus;
pub use manifest::{CompileOutput, CompiledTestOutput, Manifest};
pub use message::{ErrorEnvelope, PushMessage, SerializedError};
pub use result::{LogEntry, LogKind, TestResult, TestResultBatch, Verdict};
pub use route::Route;
