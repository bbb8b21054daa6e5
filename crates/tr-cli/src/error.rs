//! CLI errors and process exit codes.

use thiserror::Error;
use tr_redact::{RedactionError, TelemetryShape};

/// Process exit codes. Stable for scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Ok = 0,
    /// The config file could not be loaded or failed validation.
    ConfigError = 2,
    /// The input batch could not be read or parsed, or output not written.
    IoError = 3,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: RedactionError,
    },

    #[error("failed to read {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {shape} batch: {source}")]
    Parse {
        shape: TelemetryShape,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {shape} batch: {source}")]
    Encode {
        shape: TelemetryShape,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config { .. } => ExitCode::ConfigError,
            CliError::Input { .. }
            | CliError::Parse { .. }
            | CliError::Encode { .. }
            | CliError::Output { .. } => ExitCode::IoError,
        }
    }
}
