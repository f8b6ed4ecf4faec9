// ============================================================================
// transcoder-core/src/external/ffmpeg.rs
// ============================================================================
//
// FFMPEG COMMAND: Building and supervising one ffmpeg run
//
// This module assembles the fixed-shape ffmpeg invocation
// (`-y -i <input> <encoding args> <output>`) and supervises it: diagnostic
// lines go through a DiagnosticHandler, and a fatal line kills the process.
//
// KEY COMPONENTS:
// - TranscodeCommand: argument vector plus its loggable display form
// - run_transcode: spawn, stream, abort on fatal, reap
// - SupervisedRun: captured output and exit code of a finished run

use crate::error::CoreResult;
use crate::external::ffmpeg_executor::{TranscodeProcess, TranscodeSpawner};
use crate::options::EncodingSpec;
use crate::progress_reporting::{DiagnosticHandler, ProgressEvent};
use crate::utils::quote_path;

use log::{debug, info, warn};

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// One ffmpeg invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeCommand {
    program: PathBuf,
    input: PathBuf,
    encoding_args: Vec<String>,
    encoding_display: String,
    output: PathBuf,
}

impl TranscodeCommand {
    /// Builds the command for `spec`. Raw specs are tokenised here.
    pub fn new(
        program: impl Into<PathBuf>,
        input: impl Into<PathBuf>,
        spec: &EncodingSpec,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            input: input.into(),
            encoding_args: spec.to_args(),
            encoding_display: spec.to_string(),
            output: output.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn encoding_args(&self) -> &[String] {
        &self.encoding_args
    }

    /// The argument vector handed to the OS, program name excluded.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.encoding_args.len() + 4);
        args.push(OsString::from("-y"));
        args.push(OsString::from("-i"));
        args.push(self.input.clone().into_os_string());
        args.extend(self.encoding_args.iter().map(OsString::from));
        args.push(self.output.clone().into_os_string());
        args
    }
}

/// `<program> -y -i '<input>' <args> '<output>'`
impl fmt::Display for TranscodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -y -i {} {} {}",
            self.program.display(),
            quote_path(&self.input),
            self.encoding_display,
            quote_path(&self.output)
        )
    }
}

/// What a supervised run left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisedRun {
    /// Every diagnostic line, each followed by `\n`
    pub output: String,
    /// Exit code, `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
}

/// Spawns `command`, streams its diagnostics and waits for it.
///
/// Progress goes to `on_progress` as fractions of `duration`. A fatal line
/// kills and reaps the process and returns `CoreError::FatalEncoding`. The
/// exit code is logged but never turned into an error.
pub fn run_transcode<S, F>(
    spawner: &S,
    command: &TranscodeCommand,
    duration: f64,
    on_progress: F,
) -> CoreResult<SupervisedRun>
where
    S: TranscodeSpawner,
    F: FnMut(ProgressEvent),
{
    let display = command.to_string();
    let mut process = spawner.spawn(command)?;
    let mut handler = DiagnosticHandler::new(&display, duration, on_progress);

    if let Err(err) = process.handle_lines(|line| handler.handle_line(line)) {
        if let Err(kill_err) = process.kill() {
            warn!("Failed to kill ffmpeg after an aborted run: {kill_err}");
        }
        if let Err(wait_err) = process.wait() {
            warn!("Failed to reap ffmpeg after an aborted run: {wait_err}");
        }
        return Err(err);
    }

    let exit_code = process.wait()?;
    match exit_code {
        Some(0) => debug!("ffmpeg exited successfully"),
        Some(code) => info!("ffmpeg exited with status {code}"),
        None => warn!("ffmpeg was terminated by a signal"),
    }

    Ok(SupervisedRun {
        output: handler.into_output(),
        exit_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::external::mocks::{MockProcess, MockSpawner};
    use crate::options::EncodingOptions;

    fn command(spec: &EncodingSpec) -> TranscodeCommand {
        TranscodeCommand::new("ffmpeg", "/media/in put.mov", spec, "/tmp/o'ut.mp4")
    }

    #[test]
    fn test_argument_vector_shape() {
        let spec = EncodingSpec::from(
            EncodingOptions::new().with("video_codec", "libx264").with("duration", 5),
        );
        let args: Vec<String> = command(&spec)
            .args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["-y", "-i", "/media/in put.mov", "-vcodec", "libx264", "-t", "5", "/tmp/o'ut.mp4"]
        );
    }

    #[test]
    fn test_display_quotes_paths() {
        let spec = EncodingSpec::from("-vcodec copy");
        assert_eq!(
            command(&spec).to_string(),
            r"ffmpeg -y -i '/media/in put.mov' -vcodec copy '/tmp/o'\''ut.mp4'"
        );
    }

    #[test]
    fn test_raw_spec_is_tokenised() {
        let spec = EncodingSpec::from("-vf 'scale=320:240' -an");
        assert_eq!(command(&spec).encoding_args(), ["-vf", "scale=320:240", "-an"]);
    }

    #[test]
    fn test_run_collects_output_and_progress() {
        let spawner = MockSpawner::new();
        spawner.push(MockProcess::new(vec![
            b"Input #0\n".to_vec(),
            b"frame=1 time=2.50 bitrate=1k\r".to_vec(),
            b"frame=2 time=5.00 bitrate=1k\r".to_vec(),
        ]));

        let mut events = Vec::new();
        let run = run_transcode(&spawner, &command(&EncodingSpec::default()), 10.0, |p| {
            events.push(p)
        })
        .unwrap();

        assert_eq!(events, vec![0.25, 0.5]);
        assert_eq!(run.exit_code, Some(0));
        assert_eq!(
            run.output,
            "Input #0\nframe=1 time=2.50 bitrate=1k\nframe=2 time=5.00 bitrate=1k\n"
        );
        assert_eq!(spawner.calls().len(), 1);
    }

    #[test]
    fn test_fatal_line_kills_process() {
        let spawner = MockSpawner::new();
        let process = MockProcess::new(vec![
            b"Unsupported codec with id 0\n".to_vec(),
            b"never read\n".to_vec(),
        ]);
        let state = process.state();
        spawner.push(process);

        let err = run_transcode(&spawner, &command(&EncodingSpec::default()), 10.0, |_| {})
            .unwrap_err();
        match err {
            CoreError::FatalEncoding { output, .. } => {
                assert_eq!(output, "Unsupported codec with id 0\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(state.borrow().killed);
        assert!(state.borrow().waited);
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let spawner = MockSpawner::new();
        spawner.push(MockProcess::new(vec![b"Conversion failed!\n".to_vec()]).with_exit_code(Some(1)));
        let run = run_transcode(&spawner, &command(&EncodingSpec::default()), 10.0, |_| {}).unwrap();
        assert_eq!(run.exit_code, Some(1));
    }
}
