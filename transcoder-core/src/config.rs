// ============================================================================
// transcoder-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// This module defines the configuration structures and constants used throughout
// the transcoder-core library: where the external binaries live, which
// transcoder-level options are recognised, and the tolerances applied when the
// encoded output is validated.
//
// KEY COMPONENTS:
// - TranscoderConfig: locations of the ffmpeg and ffprobe binaries
// - TranscoderOptions: options that influence how encoding options are resolved
// - AspectRatioMode: which dimension is kept when preserving the aspect ratio
// - Default constants: tolerances, markers and file extensions
//
// USAGE:
// Instances of TranscoderConfig are created by consumers of the library (like
// transcoder-cli) and passed to `Transcoder::with_config`.

// ---- External crate imports ----
use serde::{Deserialize, Serialize};

// ---- Internal crate imports ----
use crate::error::CoreError;

// ---- Standard library imports ----
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Default ffprobe binary, resolved through `PATH`.
pub const DEFAULT_FFPROBE_BINARY: &str = "ffprobe";

/// Duration tolerance factor when no duration cap was requested.
pub const DEFAULT_DURATION_PRECISION: f64 = 1.1;

/// Duration tolerance factor when a duration cap was requested. Encoders round
/// timestamps more coarsely near cut points.
pub const CAPPED_DURATION_PRECISION: f64 = 1.5;

/// Output extensions for which the duration check is skipped.
pub const STILL_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Diagnostic substring that aborts a run as soon as it is seen.
pub const FATAL_MARKER: &str = "Unsupported codec";

// ============================================================================
// ASPECT RATIO PRESERVATION
// ============================================================================

/// The dimension that is kept as requested when preserving the source aspect
/// ratio; the other dimension is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatioMode {
    /// Keep the requested width, derive the height.
    Width,
    /// Keep the requested height, derive the width.
    Height,
}

impl FromStr for AspectRatioMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "width" => Ok(Self::Width),
            "height" => Ok(Self::Height),
            other => Err(CoreError::Config(format!(
                "Unknown aspect ratio mode '{other}', expected 'width' or 'height'"
            ))),
        }
    }
}

impl fmt::Display for AspectRatioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width => write!(f, "width"),
            Self::Height => write!(f, "height"),
        }
    }
}

// ============================================================================
// TRANSCODER OPTIONS
// ============================================================================

/// Options that shape how the encoding options are resolved before spawning.
///
/// # Examples
///
/// ```rust
/// use transcoder_core::config::{AspectRatioMode, TranscoderOptions};
///
/// let options = TranscoderOptions::default().preserve_aspect_ratio(AspectRatioMode::Width);
/// assert_eq!(options.preserve_aspect_ratio, Some(AspectRatioMode::Width));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscoderOptions {
    /// When set, recompute the paired dimension from the source aspect ratio.
    #[serde(default)]
    pub preserve_aspect_ratio: Option<AspectRatioMode>,
}

impl TranscoderOptions {
    /// Sets the aspect ratio preservation mode.
    #[must_use]
    pub fn preserve_aspect_ratio(mut self, mode: AspectRatioMode) -> Self {
        self.preserve_aspect_ratio = Some(mode);
        self
    }
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Locations of the external binaries used by the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscoderConfig {
    /// The ffmpeg executable used for transcoding
    pub ffmpeg_path: PathBuf,

    /// The ffprobe executable used for probing source and output files
    pub ffprobe_path: PathBuf,
}

impl Default for TranscoderConfig {
    /// Uses the sidecar ffmpeg location (next to the current executable when
    /// present, otherwise `ffmpeg` on `PATH`) and `ffprobe` on `PATH`.
    fn default() -> Self {
        Self {
            ffmpeg_path: ffmpeg_sidecar::paths::ffmpeg_path(),
            ffprobe_path: PathBuf::from(DEFAULT_FFPROBE_BINARY),
        }
    }
}

impl TranscoderConfig {
    /// Creates a configuration with explicit binary locations.
    pub fn new(ffmpeg_path: impl Into<PathBuf>, ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_mode_parsing() {
        assert_eq!("width".parse::<AspectRatioMode>().unwrap(), AspectRatioMode::Width);
        assert_eq!("Height".parse::<AspectRatioMode>().unwrap(), AspectRatioMode::Height);
        assert!(matches!(
            "diagonal".parse::<AspectRatioMode>(),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_aspect_ratio_mode_serde() {
        let options: TranscoderOptions =
            serde_json::from_str(r#"{"preserve_aspect_ratio":"height"}"#).unwrap();
        assert_eq!(options.preserve_aspect_ratio, Some(AspectRatioMode::Height));

        let unset: TranscoderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(unset.preserve_aspect_ratio, None);
    }

    #[test]
    fn test_explicit_config() {
        let config = TranscoderConfig::new("/opt/ffmpeg", "/opt/ffprobe");
        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("/opt/ffprobe"));
    }
}
