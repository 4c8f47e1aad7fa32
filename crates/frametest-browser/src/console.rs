//! Page console capture, forwarded to `tracing`.
//!
//! The driver logs every finished test and every failure to the page console.
//! Forwarding keeps that output visible in the terminal during a headless run.

use chromiumoxide::cdp::js_protocol::runtime::{ConsoleApiCalledType, EventConsoleApiCalled};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Severity of a console message, mapped from the console API that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConsoleLevel {
    Log,
    Info,
    Warning,
    Error,
    Debug,
    Other,
}

impl From<&EventConsoleApiCalled> for ConsoleLevel {
    fn from(event: &EventConsoleApiCalled) -> Self {
        match event.r#type {
            ConsoleApiCalledType::Log => ConsoleLevel::Log,
            ConsoleApiCalledType::Info => ConsoleLevel::Info,
            ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
            ConsoleApiCalledType::Error | ConsoleApiCalledType::Assert => ConsoleLevel::Error,
            ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
            _ => ConsoleLevel::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,

    /// Arguments joined with spaces
    pub text: String,

    /// `url:line:column` of the calling frame, if reported
    pub source: Option<String>,
}

impl ConsoleMessage {
    #[must_use]
    pub fn new(level: ConsoleLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Emits the message as a tracing event at the matching level.
    pub fn forward(&self) {
        match self.level {
            ConsoleLevel::Error => error!(target: "frametest::browser", "{}", self),
            ConsoleLevel::Warning => warn!(target: "frametest::browser", "{}", self),
            ConsoleLevel::Debug => debug!(target: "frametest::browser", "{}", self),
            ConsoleLevel::Log | ConsoleLevel::Info | ConsoleLevel::Other => {
                info!(target: "frametest::browser", "{}", self);
            }
        }
    }
}

impl fmt::Display for ConsoleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "[console] {} ({})", self.text, source),
            None => write!(f, "[console] {}", self.text),
        }
    }
}

/// Converts a CDP `Runtime.consoleAPICalled` event.
///
/// Primitive arguments are printed as their value, objects by description.
pub(crate) fn parse_console_event(event: &EventConsoleApiCalled) -> ConsoleMessage {
    let text = event
        .args
        .iter()
        .map(|arg| match &arg.value {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(value) => value.to_string(),
            None => arg
                .description
                .clone()
                .unwrap_or_else(|| "<object>".to_string()),
        })
        .collect::<Vec<_>>()
        .join(" ");

    let message = ConsoleMessage::new(ConsoleLevel::from(event), text);
    match event
        .stack_trace
        .as_ref()
        .and_then(|trace| trace.call_frames.first())
    {
        Some(frame) => message.with_source(format!(
            "{}:{}:{}",
            frame.url, frame.line_number, frame.column_number
        )),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_source() {
        let message = ConsoleMessage::new(ConsoleLevel::Error, "Test failed: renders")
            .with_source("http://127.0.0.1:9615/runtime-script:1:200");
        assert_eq!(
            message.to_string(),
            "[console] Test failed: renders (http://127.0.0.1:9615/runtime-script:1:200)"
        );
    }

    #[test]
    fn test_display_without_source() {
        let message = ConsoleMessage::new(ConsoleLevel::Log, "Finished test: a");
        assert_eq!(message.to_string(), "[console] Finished test: a");
    }
}
