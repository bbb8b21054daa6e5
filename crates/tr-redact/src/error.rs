//! Error types for the redaction engine.
//!
//! Every variant here is a construction-time failure. Once an engine is built,
//! redaction calls have no error path.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while building a redaction engine.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// A configured regular expression failed to compile.
    #[error("pattern error in {field}[{index}]: {source}")]
    Pattern {
        field: &'static str,
        index: usize,
        #[source]
        source: regex::Error,
    },

    /// Conflicting or out-of-range configuration settings.
    #[error("config error: {0}")]
    Config(String),

    /// Hash key material could not be decoded or is too short.
    #[error("key error: {0}")]
    Key(String),

    /// I/O error while reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RedactionError {
    /// Shorthand for a configuration conflict.
    pub fn config(message: impl Into<String>) -> Self {
        RedactionError::Config(message.into())
    }

    /// Whether this error came from the configuration contents rather than
    /// from reading them.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            RedactionError::Pattern { .. } | RedactionError::Config(_) | RedactionError::Key(_)
        )
    }
}

/// Failure reported by a sanitizer collaborator.
///
/// The value policy treats these as "no match" and counts them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// The value does not have the shape the sanitizer expects.
    #[error("unrecognised {kind} value")]
    Unrecognised { kind: &'static str },

    /// A quoted literal was opened and never closed.
    #[error("unterminated quote at byte {offset}")]
    UnterminatedQuote { offset: usize },
}
