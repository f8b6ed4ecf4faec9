//! Progress extraction from the ffmpeg diagnostic stream.
//!
//! ffmpeg reports how far it has got with a `time=` field on its status line.
//! This module turns those markers into fractions of the source duration and
//! recognises the marker that makes a run hopeless.
//!
//! # Contract
//! - Progress values are forwarded exactly as parsed: they are neither clamped
//!   to `[0.0, 1.0]` nor reordered. An encoder that over-reports, or a source
//!   whose duration was misestimated, produces values above `1.0`.
//! - A successful run ends with one final event of exactly `1.0`.

pub mod ffmpeg_handler;

pub use ffmpeg_handler::DiagnosticHandler;

use crate::config::FATAL_MARKER;
use crate::utils::parse_ffmpeg_time;

use once_cell::sync::Lazy;
use regex::Regex;

/// Fraction of the source duration that has been encoded.
pub type ProgressEvent = f64;

static TIME_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=(\d+:\d+:\d+\.\d+|\d+\.\d+)").expect("time marker pattern is valid")
});

/// Extracts the elapsed encode time, in seconds, from a diagnostic line.
///
/// Both `time=12.50` and the `time=00:00:12.50` form printed by current
/// ffmpeg builds are recognised.
#[must_use]
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let captures = TIME_MARKER.captures(line)?;
    let value = captures.get(1)?.as_str();
    if value.contains(':') {
        parse_ffmpeg_time(value)
    } else {
        value.parse().ok()
    }
}

/// Converts elapsed seconds into a progress fraction. `None` when the source
/// duration is unknown.
#[must_use]
pub fn progress_fraction(elapsed_secs: f64, total_secs: f64) -> Option<ProgressEvent> {
    (total_secs > 0.0).then(|| elapsed_secs / total_secs)
}

/// True when the line carries the fatal encoder marker.
#[must_use]
pub fn is_fatal_line(line: &str) -> bool {
    line.contains(FATAL_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds_marker() {
        assert_eq!(
            parse_progress_time("frame=  120 fps= 30 q=28.0 size=  256kB time=12.5 bitrate= 167.5kbits/s"),
            Some(12.5)
        );
        assert_eq!(parse_progress_time("size=0kB time=0.00 bitrate=N/A"), Some(0.0));
    }

    #[test]
    fn test_parse_clock_marker() {
        assert_eq!(
            parse_progress_time("frame=  300 fps=0.0 q=-1.0 size=1024kB time=00:01:02.50 bitrate=134.2kbits/s speed=2x"),
            Some(62.5)
        );
    }

    #[test]
    fn test_lines_without_marker() {
        assert_eq!(parse_progress_time("Stream #0:0: Video: h264"), None);
        assert_eq!(parse_progress_time("time=N/A bitrate=N/A"), None);
        assert_eq!(parse_progress_time("time=12 bitrate=N/A"), None);
    }

    #[test]
    fn test_progress_fraction_is_unclamped() {
        assert_eq!(progress_fraction(12.5, 25.0), Some(0.5));
        assert_eq!(progress_fraction(30.0, 25.0), Some(1.2));
        assert_eq!(progress_fraction(1.0, 0.0), None);
    }

    #[test]
    fn test_fatal_marker_is_case_sensitive() {
        assert!(is_fatal_line("[mp4 @ 0x1] Unsupported codec with id 98314 for input stream 2"));
        assert!(!is_fatal_line("unsupported codec"));
    }
}
