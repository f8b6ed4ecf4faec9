// ============================================================================
// transcoder-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the transcoder-core library
//
// This module defines the error type shared by every component of the core
// library, the result alias built on it, and small constructor helpers for
// the errors raised around external processes.
//
// KEY COMPONENTS:
// - CoreError: all failure modes of a transcode (configuration, fatal encoder
//   output, failed validation) plus the ambient I/O and process errors
// - CoreResult: result alias used throughout the crate
// - Helper functions for process-related errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Custom error type for transcoder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The encoding options could not be interpreted. Raised at construction,
    /// before any process is spawned.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The encoder printed a fatal marker while running.
    #[error("Failed encoding: {line}")]
    FatalEncoding {
        /// Diagnostic line that contained the marker
        line: String,
        /// Display form of the command that was running
        command: String,
        /// Diagnostic output captured up to and including `line`
        output: String,
    },

    /// The process finished but the output failed validation.
    #[error("Failed encoding.{}Full output: {output}", format_errors(.errors))]
    Validation {
        /// Display form of the command that ran
        command: String,
        /// Validation reasons joined with ", " (empty when none were recorded)
        errors: String,
        /// Full diagnostic output of the run
        output: String,
    },

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to wait for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for transcoder-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

fn format_errors(errors: &str) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(" Errors: {errors}. ")
    }
}

/// Builds a `CoreError::CommandStart` for a process that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a `CoreError::CommandWait` for a process that could not be reaped.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_includes_errors_and_output() {
        let err = CoreError::Validation {
            command: "ffmpeg -y -i 'a.mp4' '' 'b.mp4'".to_string(),
            errors: "no output file created".to_string(),
            output: "frame=1\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed encoding. Errors: no output file created. Full output: frame=1\n"
        );
    }

    #[test]
    fn validation_message_without_errors() {
        let err = CoreError::Validation {
            command: String::new(),
            errors: String::new(),
            output: "out".to_string(),
        };
        assert_eq!(err.to_string(), "Failed encoding.Full output: out");
    }

    #[test]
    fn fatal_message_carries_line() {
        let err = CoreError::FatalEncoding {
            line: "Unsupported codec with id 100".to_string(),
            command: String::new(),
            output: String::new(),
        };
        assert_eq!(err.to_string(), "Failed encoding: Unsupported codec with id 100");
    }
}
