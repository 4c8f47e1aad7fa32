use crate::config::FrametestConfig;
use crate::error::{ConfigError, Result};
use regex::Regex;

/// Checks one `fileExtensions` entry: no leading `.`, no wildcard.
pub fn validate_extension(extension: &str) -> Result<(), ConfigError> {
    let invalid = |hint: &str| ConfigError::InvalidValue {
        field: "fileExtensions".to_string(),
        value: extension.to_string(),
        hint: hint.to_string(),
    };

    if extension.is_empty() {
        return Err(invalid("Extensions cannot be empty"));
    }
    if extension.starts_with('.') {
        return Err(invalid("List extensions without the leading '.' (e.g. \"ts\")"));
    }
    if extension.contains('*') {
        return Err(invalid("Extensions are matched literally; remove the '*'"));
    }
    Ok(())
}

impl FrametestConfig {
    /// Validates the merged configuration before anything is served.
    ///
    /// # Errors
    ///
    /// The first problem found, as a [`ConfigError`].
    pub fn validate(&self) -> Result<()> {
        if self.file_extensions.is_empty() {
            return Err(ConfigError::MissingField {
                field: "fileExtensions".to_string(),
                hint: "List at least one extension, e.g. [\"ts\", \"tsx\"]".to_string(),
            }
            .into());
        }
        for extension in &self.file_extensions {
            validate_extension(extension)?;
        }

        self.test_regex()?;

        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "host".to_string(),
                hint: "Set host to the interface to listen on, e.g. \"127.0.0.1\"".to_string(),
            }
            .into());
        }

        if self.port != 0 && self.port == self.push_port {
            return Err(ConfigError::ConflictingOptions(format!(
                "port and pushPort are both {}",
                self.port
            ))
            .into());
        }

        for (field, value) in [
            ("theme.script", &self.theme.script),
            ("theme.style", &self.theme.style),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                    hint: "Point [theme] at the theme's script and stylesheet".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// The compiled `testRegex`.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if the pattern does not compile.
    pub fn test_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.test_regex).map_err(|e| ConfigError::InvalidValue {
            field: "testRegex".to_string(),
            value: self.test_regex.clone(),
            hint: e.to_string(),
        })
    }
}
