//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `encode` command.
/// Runs one supervised, validated transcode.
pub mod encode;

/// Module containing the implementation of the `probe` command.
pub mod probe;
