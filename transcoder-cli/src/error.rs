// transcoder-cli/src/error.rs
//
// The CLI reports every failure as a `CoreError`. Commands attach a short
// description of what they were doing when a core call fails.

use transcoder_core::{CoreError, CoreResult};

use std::fmt;

/// Result of a CLI command.
pub type CliResult<T> = CoreResult<T>;

/// Prefixes a failure with what the command was doing.
///
/// The failure becomes `CoreError::OperationFailed("<context>: <error>")`.
pub trait CliErrorContext<T> {
    fn cli_context<C: fmt::Display>(self, context: C) -> CliResult<T>;

    /// Like [`cli_context`](Self::cli_context), building the context only on failure.
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C: fmt::Display>(self, context: C) -> CliResult<T> {
        self.cli_with_context(|| context)
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let cause: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {cause}", f()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_context_prefixes_core_message() {
        let result: Result<(), io::Error> = Err(io::Error::other("disk full"));
        let err = result.cli_context("Failed to read options file").unwrap_err();
        assert_eq!(err.to_string(), "Failed to read options file: IO error: disk full");
    }

    #[test]
    fn test_context_is_built_lazily() {
        let ok: Result<u8, CoreError> = Ok(3);
        let value = ok
            .cli_with_context(|| -> String { panic!("context built on success") })
            .unwrap();
        assert_eq!(value, 3);
    }
}
