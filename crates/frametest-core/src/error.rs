//! Error types for decoding and validating wire payloads.

use thiserror::Error;

/// Errors raised while validating data that arrived over the wire.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field was absent (or empty, for `name`).
    #[error("Missing \"{0}\" on posted test result.")]
    MissingField(&'static str),

    /// The payload was not shaped the way the protocol requires.
    #[error("{0}")]
    InvalidPayload(String),

    /// The body could not be parsed as JSON at all.
    #[error("Unable to parse request. Expected JSON object.")]
    MalformedJson(#[source] serde_json::Error),
}

/// Result alias used throughout the core crate.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
