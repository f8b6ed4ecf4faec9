// ============================================================================
// transcoder-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates every interaction with the external command-line
// tools. Spawning ffmpeg and probing media files sit behind traits so the
// transcoder can be driven by scripted implementations in tests.
//
// KEY COMPONENTS:
// - TranscodeSpawner / TranscodeProcess: running ffmpeg and reading stderr
// - TranscodeCommand / run_transcode: the supervised ffmpeg invocation
// - MediaProber / FfprobeProber: media facts through ffprobe
// - Dependency checking

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// The ffmpeg invocation and its supervision
pub mod ffmpeg;

/// Traits and implementations for spawning ffmpeg processes
pub mod ffmpeg_executor;

/// Traits and implementations for probing media files
pub mod ffprobe_executor;

/// Scripted spawner, process and prober for tests
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

// ----- FFmpeg Execution -----
pub use ffmpeg::{SupervisedRun, TranscodeCommand, run_transcode};
pub use ffmpeg_executor::{ChildProcess, ProcessSpawner, TranscodeProcess, TranscodeSpawner};

// ----- FFprobe Execution -----
pub use ffprobe_executor::{FfprobeProber, MediaProber};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command can be started.
///
/// Runs `<cmd> -version` with its output discarded. Only whether the process
/// starts matters, not its exit status.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - the executable does not exist
/// * `CoreError::CommandStart` - it exists but could not be started
pub fn check_dependency(cmd: &Path) -> CoreResult<()> {
    let result = Command::new(cmd)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd.display());
            Err(CoreError::DependencyNotFound(cmd.display().to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd.display(), e);
            Err(CoreError::CommandStart(cmd.display().to_string(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency() {
        let err = check_dependency(Path::new("/nonexistent/bin/ffmpeg-missing")).unwrap_err();
        assert!(matches!(err, CoreError::DependencyNotFound(name) if name.ends_with("ffmpeg-missing")));
    }
}
