//! Encoded duration validation

use crate::config::{CAPPED_DURATION_PRECISION, DEFAULT_DURATION_PRECISION, STILL_IMAGE_EXTENSIONS};
use crate::media::SourceMedia;
use crate::options::EncodingSpec;

use std::ffi::OsStr;
use std::path::Path;

/// Whether the encoded duration of this run can be checked at all.
///
/// Estimated source durations, still-image outputs and raw option strings
/// (whose duration cap cannot be read) are never checked.
pub fn should_validate_duration(source: &SourceMedia, output_path: &Path, spec: &EncodingSpec) -> bool {
    if source.duration_uncertain {
        log::debug!("Source duration is an estimate, skipping duration check");
        return false;
    }
    if spec.is_raw() {
        log::debug!("Raw encoding options, skipping duration check");
        return false;
    }
    let still_image = output_path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| STILL_IMAGE_EXTENSIONS.contains(&ext));
    if still_image {
        log::debug!("Still image output, skipping duration check");
    }
    !still_image
}

/// Accepted encoded durations: `(desired / precision, desired * precision)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationWindow {
    pub desired: f64,
    pub precision: f64,
}

impl DurationWindow {
    /// A requested cap loosens the precision whatever its value, and becomes
    /// the target when it is shorter than the source.
    pub fn new(source_duration: f64, cap: Option<f64>) -> Self {
        match cap {
            Some(cap) => Self {
                desired: cap.min(source_duration),
                precision: CAPPED_DURATION_PRECISION,
            },
            None => Self {
                desired: source_duration,
                precision: DEFAULT_DURATION_PRECISION,
            },
        }
    }

    /// Both bounds are exclusive.
    pub fn contains(&self, actual: f64) -> bool {
        actual < self.desired * self.precision && actual > self.desired / self.precision
    }
}

/// Checks the encoded duration against the source duration and the cap in
/// `spec`. Returns the failure reason, if any.
pub fn validate_duration(source: &SourceMedia, spec: &EncodingSpec, actual: f64) -> Option<String> {
    let window = DurationWindow::new(source.duration, spec.duration_cap());
    log::debug!(
        "Duration check: wanted {:.3}s (precision {}), got {:.3}s",
        window.desired,
        window.precision,
        actual
    );
    if window.contains(actual) {
        None
    } else {
        Some(format!(
            "encoded file duration differed from original/specified duration (wanted: {:?}sec, got: {:?}sec)",
            window.desired, actual
        ))
    }
}
