//! FFprobe integration for media facts
//!
//! This module runs ffprobe on a file and reduces its JSON report and its
//! diagnostic output to a [`SourceMedia`]: duration and whether that duration
//! is only an estimate, display aspect ratio, and whether the file is a
//! readable media file at all.

use crate::config::DEFAULT_FFPROBE_BINARY;
use crate::error::{CoreError, CoreResult, command_start_error};
use crate::media::SourceMedia;
use crate::utils::decode_diagnostic_line;

use ffprobe::FfProbe;

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// ffprobe prints this when it had to derive the duration from the bitrate.
const UNCERTAIN_DURATION_MARKER: &str = "Estimating duration from bitrate, this may be inaccurate";

/// Diagnostic fragments that mean ffprobe could not make sense of the file.
const INVALID_MEDIA_MARKERS: &[&str] = &[
    "is not supported",
    "could not find codec parameters",
    "Invalid data found when processing input",
];

/// Anything that can report facts about a media file.
pub trait MediaProber {
    fn probe(&self, path: &Path) -> CoreResult<SourceMedia>;
}

/// Production prober backed by the ffprobe executable.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe_path
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new(DEFAULT_FFPROBE_BINARY)
    }
}

impl MediaProber for FfprobeProber {
    fn probe(&self, path: &Path) -> CoreResult<SourceMedia> {
        if !path.exists() {
            return Err(CoreError::InputNotFound(path.to_path_buf()));
        }
        log::debug!("Running ffprobe on: {}", path.display());

        let name = self.ffprobe_path.display().to_string();
        let output = Command::new(&self.ffprobe_path)
            .args(["-hide_banner", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    CoreError::DependencyNotFound(name.clone())
                } else {
                    command_start_error(name.clone(), e)
                }
            })?;

        // A non-zero exit still describes the file; only a signal leaves no verdict.
        if output.status.code().is_none() {
            return Err(CoreError::Probe(format!(
                "{name} was terminated by a signal while probing {}",
                path.display()
            )));
        }

        let stderr = decode_diagnostic_line(&output.stderr);
        let report = match serde_json::from_slice::<FfProbe>(&output.stdout) {
            Ok(report) => Some(report),
            Err(err) => {
                log::debug!("Unparseable ffprobe report for {}: {err}", path.display());
                None
            }
        };

        let media = media_from_probe(path, report.as_ref(), &stderr);
        log::debug!("Probed {}: {:?}", path.display(), media);
        Ok(media)
    }
}

/// Reduces an ffprobe report and its diagnostic output to media facts.
///
/// A missing report (unparseable stdout) yields an invalid file of unknown
/// duration.
pub fn media_from_probe(path: &Path, report: Option<&FfProbe>, stderr: &str) -> SourceMedia {
    let Some(report) = report else {
        return SourceMedia::new(path, 0.0).invalid();
    };

    let video = report
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let audio = report
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let duration = parse_seconds(report.format.duration.as_deref())
        .or_else(|| {
            report
                .streams
                .iter()
                .find_map(|s| parse_seconds(s.duration.as_deref()))
        })
        .unwrap_or(0.0);

    let mut media = SourceMedia::new(path, duration);
    media.duration_uncertain = stderr.contains(UNCERTAIN_DURATION_MARKER);
    media.valid = (video.is_some() || audio.is_some())
        && !INVALID_MEDIA_MARKERS.iter().any(|m| stderr.contains(m));

    if let Some(video) = video {
        media.width = video.width.and_then(|w| u32::try_from(w).ok());
        media.height = video.height.and_then(|h| u32::try_from(h).ok());
        media.video_codec = video.codec_name.clone();
        media.aspect_ratio = video
            .display_aspect_ratio
            .as_deref()
            .and_then(parse_ratio)
            .or_else(|| match (media.width, media.height) {
                (Some(w), Some(h)) if w > 0 && h > 0 => Some(f64::from(w) / f64::from(h)),
                _ => None,
            });
    }
    media.audio_codec = audio.and_then(|a| a.codec_name.clone());

    media
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0)
}

/// Parses a "W:H" ratio; "0:1" and other degenerate ratios yield `None`.
fn parse_ratio(value: &str) -> Option<f64> {
    let (w, h) = value.split_once(':')?;
    let w = w.trim().parse::<f64>().ok()?;
    let h = h.trim().parse::<f64>().ok()?;
    (w > 0.0 && h > 0.0).then(|| w / h)
}
