//! `FFmpeg` diagnostic line handler
//!
//! This module consumes the stderr lines of a running ffmpeg process one at a
//! time: it keeps the full output for error reports, relays progress to the
//! caller and stops the run when the fatal marker shows up.

use crate::error::{CoreError, CoreResult};
use crate::progress_reporting::{
    ProgressEvent, is_fatal_line, parse_progress_time, progress_fraction,
};
use crate::utils::{decode_diagnostic_line, format_duration};

/// Handler for the diagnostic lines of one run
pub struct DiagnosticHandler<'c, F>
where
    F: FnMut(ProgressEvent),
{
    command: &'c str,
    duration: f64,
    on_progress: F,
    output: String,
    last_logged_percent_threshold: i64,
}

impl<'c, F> DiagnosticHandler<'c, F>
where
    F: FnMut(ProgressEvent),
{
    /// Creates a handler for a run of `command` over a source of `duration` seconds.
    pub fn new(command: &'c str, duration: f64, on_progress: F) -> Self {
        Self {
            command,
            duration,
            on_progress,
            output: String::new(),
            last_logged_percent_threshold: -1,
        }
    }

    /// Handles one raw line (without its terminator).
    ///
    /// Returns `CoreError::FatalEncoding` when the line carries the fatal
    /// marker; the caller must stop reading.
    pub fn handle_line(&mut self, raw: &[u8]) -> CoreResult<()> {
        let line = decode_diagnostic_line(raw);
        self.output.push_str(&line);
        self.output.push('\n');
        log::debug!(target: "ffmpeg_log", "{line}");

        if let Some(elapsed) = parse_progress_time(&line) {
            self.handle_progress(elapsed);
        }

        if is_fatal_line(&line) {
            log::error!(
                "Failed encoding...\nCommand\n{}\nOutput\n{}",
                self.command,
                self.output
            );
            return Err(CoreError::FatalEncoding {
                line: line.into_owned(),
                command: self.command.to_string(),
                output: self.output.clone(),
            });
        }

        Ok(())
    }

    /// Gets the accumulated diagnostic output
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the handler, returning the accumulated diagnostic output
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    fn handle_progress(&mut self, elapsed: f64) {
        let Some(progress) = progress_fraction(elapsed, self.duration) else {
            return;
        };
        (self.on_progress)(progress);
        self.log_progress_if_needed(progress, elapsed);
    }

    /// Logs at info level each time another 10% is crossed.
    fn log_progress_if_needed(&mut self, progress: ProgressEvent, elapsed: f64) {
        let percent = progress * 100.0;
        let current_threshold = (percent as i64 / 10) * 10;
        if current_threshold > self.last_logged_percent_threshold {
            log::info!(
                target: "transcoder::progress",
                "Encoding progress: {:.1}% complete | Time: {} / {}",
                percent,
                format_duration(elapsed),
                format_duration(self.duration)
            );
            self.last_logged_percent_threshold = current_threshold;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_relayed_as_fraction() {
        let mut events = Vec::new();
        let mut handler = DiagnosticHandler::new("ffmpeg", 25.0, |p| events.push(p));
        handler.handle_line(b"frame=1 time=12.5 bitrate=1k").unwrap();
        handler.handle_line(b"frame=2 time=30.0 bitrate=1k").unwrap();
        handler.handle_line(b"frame=3 time=5.0 bitrate=1k").unwrap();
        drop(handler);
        assert_eq!(events, vec![0.5, 1.2, 0.2]);
    }

    #[test]
    fn test_output_accumulates_every_line() {
        let mut handler = DiagnosticHandler::new("ffmpeg", 10.0, |_| {});
        handler.handle_line(b"Input #0, mov").unwrap();
        handler.handle_line(b"caf\xe9").unwrap();
        assert_eq!(handler.output(), "Input #0, mov\ncafé\n");
    }

    #[test]
    fn test_fatal_marker_aborts_with_context() {
        let mut handler = DiagnosticHandler::new("ffmpeg -y -i 'a' 'b'", 10.0, |_| {});
        handler.handle_line(b"Stream mapping:").unwrap();
        let err = handler
            .handle_line(b"Unsupported codec with id 100 for input stream 0")
            .unwrap_err();
        match err {
            CoreError::FatalEncoding { line, command, output } => {
                assert_eq!(line, "Unsupported codec with id 100 for input stream 0");
                assert_eq!(command, "ffmpeg -y -i 'a' 'b'");
                assert!(output.starts_with("Stream mapping:\n"));
                assert!(output.ends_with("input stream 0\n"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_duration_emits_nothing() {
        let mut events = Vec::new();
        let mut handler = DiagnosticHandler::new("ffmpeg", 0.0, |p| events.push(p));
        handler.handle_line(b"time=1.00").unwrap();
        drop(handler);
        assert!(events.is_empty());
    }
}
