// transcoder-cli/src/lib.rs
//
// Library portion of the Transcoder CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, EncodeArgs, ProbeArgs};
pub use commands::encode::run_encode;
pub use commands::probe::run_probe;
pub use error::{CliErrorContext, CliResult};
