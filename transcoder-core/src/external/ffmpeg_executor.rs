// ============================================================================
// transcoder-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning an ffmpeg process and reading
// its diagnostic channel. The running process is hidden behind a trait so the
// supervisor can be driven by scripted processes in tests.
//
// KEY COMPONENTS:
// - TranscodeProcess: Trait representing an active ffmpeg process
// - TranscodeSpawner: Trait for creating new ffmpeg processes
// - ProcessSpawner / ChildProcess: Concrete implementation using ffmpeg-sidecar
// - for_each_diagnostic_line: CR/LF aware line splitter over raw bytes

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use crate::external::ffmpeg::TranscodeCommand;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::read_until_any::read_until_any;

use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait TranscodeProcess {
    /// Feeds every diagnostic line, without its terminator, to `handler`.
    ///
    /// Returns when the stream closes or as soon as `handler` fails.
    fn handle_lines<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(&[u8]) -> CoreResult<()>;

    /// Waits for the process to exit. `None` when it was ended by a signal.
    fn wait(&mut self) -> CoreResult<Option<i32>>;

    /// Terminates the process.
    fn kill(&mut self) -> CoreResult<()>;
}

/// Trait representing something that can spawn a [`TranscodeProcess`].
pub trait TranscodeSpawner {
    type Process: TranscodeProcess;

    /// The executable named in the command's display form.
    fn program(&self) -> &Path;

    fn spawn(&self, cmd: &TranscodeCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` reading raw stderr.
pub struct ChildProcess {
    child: SidecarChild,
    name: String,
}

impl ChildProcess {
    fn new(mut child: SidecarChild, name: String) -> Self {
        // Closing stdin keeps ffmpeg from waiting on interactive commands.
        drop(child.take_stdin());
        Self { child, name }
    }
}

impl TranscodeProcess for ChildProcess {
    fn handle_lines<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(&[u8]) -> CoreResult<()>,
    {
        let stderr = self.child.take_stderr().ok_or_else(|| {
            CoreError::OperationFailed(format!("{}: stderr is not captured", self.name))
        })?;
        for_each_diagnostic_line(BufReader::new(stderr), handler)
    }

    fn wait(&mut self) -> CoreResult<Option<i32>> {
        self.child
            .wait()
            .map(|status| status.code())
            .map_err(|e| command_wait_error(self.name.clone(), e))
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.child.kill().map_err(CoreError::from)
    }
}

/// Spawns ffmpeg directly, without an intermediate shell.
///
/// The command is handed to ffmpeg-sidecar as a prepared `Command`, so none of
/// its default arguments (`-loglevel level+info`) are added and the argument
/// vector stays exactly as [`TranscodeCommand::args`] builds it.
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    ffmpeg_path: PathBuf,
}

impl ProcessSpawner {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

impl Default for ProcessSpawner {
    fn default() -> Self {
        Self::new(ffmpeg_sidecar::paths::ffmpeg_path())
    }
}

impl TranscodeSpawner for ProcessSpawner {
    type Process = ChildProcess;

    fn program(&self) -> &Path {
        &self.ffmpeg_path
    }

    fn spawn(&self, cmd: &TranscodeCommand) -> CoreResult<Self::Process> {
        let name = self.ffmpeg_path.display().to_string();
        let mut command = Command::new(&self.ffmpeg_path);
        // ffmpeg-sidecar requires every stdio channel to be piped.
        command
            .args(cmd.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        FfmpegCommand::from(command)
            .spawn()
            .map(|child| ChildProcess::new(child, name.clone()))
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    log::error!("ffmpeg executable not found at '{name}'");
                    CoreError::DependencyNotFound(name.clone())
                } else {
                    command_start_error(name.clone(), e)
                }
            })
    }
}

// --- Line splitting ---

/// Splits a diagnostic byte stream into lines.
///
/// Both `\r` (ffmpeg's status line) and `\n` terminate a line. Empty segments
/// are skipped and a trailing unterminated line is delivered at end of stream.
pub fn for_each_diagnostic_line<R, F>(mut reader: R, mut handler: F) -> CoreResult<()>
where
    R: BufRead,
    F: FnMut(&[u8]) -> CoreResult<()>,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if read_until_any(&mut reader, LINE_TERMINATORS, &mut buf)? == 0 {
            return Ok(());
        }
        let line = trim_terminators(&buf);
        if !line.is_empty() {
            handler(line)?;
        }
    }
}

const LINE_TERMINATORS: &[u8] = b"\r\n";

/// `read_until_any` keeps leading terminators of a read and the trailing one.
fn trim_terminators(buf: &[u8]) -> &[u8] {
    let is_line = |b: &u8| !LINE_TERMINATORS.contains(b);
    match buf.iter().position(is_line) {
        Some(start) => {
            let end = buf.iter().rposition(is_line).map_or(start, |i| i + 1);
            &buf[start..end]
        }
        None => &[],
    }
}
