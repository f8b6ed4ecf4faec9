//! Utility functions for text decoding, time parsing and formatting.
//!
//! This module provides general-purpose helpers used throughout the
//! transcoder-core library and by the CLI: decoding raw diagnostic bytes,
//! parsing ffmpeg timestamps, shell-quoting paths and formatting durations
//! and byte counts for display.

use std::borrow::Cow;
use std::path::Path;

/// Decodes one raw diagnostic line.
///
/// Valid UTF-8 is borrowed as-is. Anything else is reinterpreted as
/// ISO-8859-1, where every byte maps to the code point of the same value, so
/// no byte is ever lost or replaced.
#[must_use]
pub fn decode_diagnostic_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Parses FFmpeg time string (HH:MM:SS.MS) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Wraps a path in single quotes for display in a shell-style command line.
/// Embedded single quotes are written as `'\''`.
#[must_use]
pub fn quote_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_is_borrowed() {
        let line = "frame=  10 time=00:00:01.00 título".as_bytes();
        let decoded = decode_diagnostic_line(line);
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "frame=  10 time=00:00:01.00 título");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "caf\xe9 time=1.50" is ISO-8859-1 for "café time=1.50"
        let line = b"caf\xe9 time=1.50";
        let decoded = decode_diagnostic_line(line);
        assert!(matches!(decoded, Cow::Owned(_)));
        assert_eq!(decoded, "café time=1.50");
        assert_eq!(decoded.chars().count(), line.len());
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        // Test valid times
        assert_eq!(parse_ffmpeg_time("00:00:00"), Some(0.0));
        assert_eq!(parse_ffmpeg_time("00:01:00"), Some(60.0));
        assert_eq!(parse_ffmpeg_time("01:02:03"), Some(3723.0));

        // Test with fractional seconds
        assert_eq!(parse_ffmpeg_time("00:00:00.5"), Some(0.5));
        assert_eq!(parse_ffmpeg_time("01:30:45.75"), Some(5445.75));

        // Test invalid formats
        assert_eq!(parse_ffmpeg_time(""), None);
        assert_eq!(parse_ffmpeg_time("00:00"), None);
        assert_eq!(parse_ffmpeg_time("00:00:00:00"), None);
        assert_eq!(parse_ffmpeg_time("aa:bb:cc"), None);
    }

    #[test]
    fn test_quote_path() {
        assert_eq!(quote_path(Path::new("/tmp/in.mp4")), "'/tmp/in.mp4'");
        assert_eq!(quote_path(Path::new("/tmp/it's.mp4")), r"'/tmp/it'\''s.mp4'");
        assert_eq!(quote_path(Path::new("my movie.mov")), "'my movie.mov'");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(59.9), "00:00:59");
        assert_eq!(format_duration(3661.0), "01:01:01");
        assert_eq!(format_duration(90061.0), "25:01:01");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(1024 * 1024 * 2), "2.00 MiB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GiB");
    }
}
