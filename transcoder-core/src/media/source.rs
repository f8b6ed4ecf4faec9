use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Read-only facts about a media file.
///
/// Describes the input of a transcode and, once probed, its encoded output.
/// The transcoder never mutates a `SourceMedia`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMedia {
    /// Location of the file
    pub path: PathBuf,

    /// Duration in seconds, `0.0` when unknown
    pub duration: f64,

    /// True when the duration was estimated (e.g. from the bitrate) and
    /// should not be used for validation
    pub duration_uncertain: bool,

    /// Display aspect ratio (width / height), if known
    pub aspect_ratio: Option<f64>,

    /// Whether the prober considered the file a readable media file
    pub valid: bool,

    /// Width of the first video stream
    pub width: Option<u32>,

    /// Height of the first video stream
    pub height: Option<u32>,

    /// Codec of the first video stream
    pub video_codec: Option<String>,

    /// Codec of the first audio stream
    pub audio_codec: Option<String>,
}

impl SourceMedia {
    /// Creates facts for a valid file with a certain duration and nothing else known.
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
            duration_uncertain: false,
            aspect_ratio: None,
            valid: true,
            width: None,
            height: None,
            video_codec: None,
            audio_codec: None,
        }
    }

    /// Sets the aspect ratio.
    #[must_use]
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    /// Marks the duration as estimated.
    #[must_use]
    pub fn with_uncertain_duration(mut self) -> Self {
        self.duration_uncertain = true;
        self
    }

    /// Marks the file as invalid.
    #[must_use]
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// "WxH" of the first video stream, when both dimensions are known.
    pub fn resolution(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{w}x{h}")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_helpers() {
        let media = SourceMedia::new("/in.mp4", 10.0)
            .with_aspect_ratio(16.0 / 9.0)
            .with_uncertain_duration();
        assert!(media.valid);
        assert!(media.duration_uncertain);
        assert_eq!(media.aspect_ratio, Some(16.0 / 9.0));
        assert!(!media.clone().invalid().valid);
        assert_eq!(media.resolution(), None);
    }
}
