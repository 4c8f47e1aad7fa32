//! Push-channel messages.
//!
//! ```json
//! { "type": "reload" }
//! { "type": "error", "message": { "type": "error", "message": { "name": "...", "message": "...", "stack": "..." } } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An error flattened into plain JSON so it can cross process boundaries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SerializedError {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stack: String,
    /// Any other own properties the error carried
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SerializedError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    /// Builds a serialized error from any std error, using its source chain
    /// as the stack.
    pub fn from_error(name: &str, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut stack = format!("{name}: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(name, err.to_string()).with_stack(stack)
    }

    /// Text shown to the user in place of the page.
    pub fn display_text(&self) -> String {
        if !self.stack.is_empty() {
            self.stack.clone()
        } else if self.name.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.name, self.message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    #[default]
    Error,
}

/// Inner `{ "type": "error", "message": ... }` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "type", default)]
    pub kind: EnvelopeKind,
    pub message: SerializedError,
}

impl From<SerializedError> for ErrorEnvelope {
    fn from(message: SerializedError) -> Self {
        Self {
            kind: EnvelopeKind::Error,
            message,
        }
    }
}

/// A notification broadcast to every connected driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushMessage {
    /// Compilation succeeded; reload the page
    Reload,
    /// Compilation failed; render the error and halt
    Error { message: ErrorEnvelope },
}

impl PushMessage {
    pub fn error(error: SerializedError) -> Self {
        Self::Error {
            message: error.into(),
        }
    }
}
