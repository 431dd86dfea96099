//! Errors raised while loading a relay configuration

use std::fmt;
use std::io;
use thiserror::Error;

/// Failure to turn a file into a valid `RelayConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed {format} in '{path}'{}: {message}", location(.line, .column))]
    Syntax {
        path: String,
        format: &'static str,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("environment variable '{var}' is referenced but not set")]
    MissingEnvVar { var: String },
}

fn location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at {}:{}", line, column),
        (Some(line), None) => format!(" at line {}", line),
        _ => String::new(),
    }
}

/// A rejected setting, addressed by its dotted path (e.g. `backend.base_url`)
#[derive(Debug, Error)]
pub struct ValidationError {
    pub field: String,
    pub kind: ValidationErrorKind,
    pub hint: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid setting '{}': {}", self.field, self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, " ({})", hint)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("value is required")]
    Missing,

    #[error("out of range, {0}")]
    OutOfRange(String),

    #[error("bad format, {0}")]
    BadFormat(String),

    #[error("not a usable URL, {0}")]
    BadUrl(String),

    #[error("unsupported version '{found}', expected '{expected}'")]
    UnsupportedVersion { expected: String, found: String },
}

impl ValidationError {
    fn at(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
            hint: None,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::at(field, ValidationErrorKind::Missing)
    }

    pub fn out_of_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(field, ValidationErrorKind::OutOfRange(message.into()))
    }

    pub fn bad_format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(field, ValidationErrorKind::BadFormat(message.into()))
    }

    pub fn bad_url(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(field, ValidationErrorKind::BadUrl(message.into()))
    }

    pub fn unsupported_version(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::at(
            "version",
            ValidationErrorKind::UnsupportedVersion {
                expected: expected.into(),
                found: found.into(),
            },
        )
    }

    /// Attach a human-readable hint shown after the message
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ValidationError::missing("defaults.system_instruction").with_hint("persona is blank");
        assert_eq!(
            err.to_string(),
            "invalid setting 'defaults.system_instruction': value is required (persona is blank)"
        );
    }

    #[test]
    fn test_syntax_location() {
        let err = ConfigError::Syntax {
            path: "relay.yaml".to_string(),
            format: "YAML",
            line: Some(3),
            column: Some(7),
            message: "unexpected ':'".to_string(),
        };
        assert_eq!(err.to_string(), "malformed YAML in 'relay.yaml' at 3:7: unexpected ':'");
    }
}
