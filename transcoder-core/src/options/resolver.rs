//! Derives effective encoding options from transcoder options and source facts.
//!
//! The only derivation today is aspect-ratio preservation: the caller asks for a
//! width (or a height) and the paired dimension is computed from the source's
//! aspect ratio, rounded to an even number of pixels as most video encoders
//! require.

use crate::config::{AspectRatioMode, TranscoderOptions};
use crate::media::SourceMedia;
use crate::options::EncodingSpec;

use log::{debug, warn};

/// Rounds a derived dimension to an even integer.
///
/// Takes the ceiling when it is even, the floor otherwise; a value that was
/// already an odd integer is bumped up by one. Returns `None` for values that
/// are not finite and positive.
///
/// ```rust
/// use transcoder_core::options::even_dimension;
///
/// assert_eq!(even_dimension(359.4), Some(360));
/// assert_eq!(even_dimension(544.68), Some(544));
/// assert_eq!(even_dimension(35.0), Some(36));
/// ```
#[must_use]
pub fn even_dimension(value: f64) -> Option<u32> {
    if !value.is_finite() || value <= 0.0 || value > f64::from(u32::MAX - 1) {
        return None;
    }
    let ceil = value.ceil() as u32;
    let mut rounded = if ceil % 2 == 0 { ceil } else { value.floor() as u32 };
    if rounded % 2 != 0 {
        rounded += 1;
    }
    Some(rounded)
}

/// Applies `options` to `spec` in place.
///
/// With `preserve_aspect_ratio` set and a known source aspect ratio, the
/// `resolution` option is replaced by one whose derived dimension keeps the
/// source ratio. Raw specs, unknown aspect ratios and options without the
/// requested dimension are left untouched. Returns the resolution that was set.
pub fn apply_transcoder_options(
    spec: &mut EncodingSpec,
    source: &SourceMedia,
    options: &TranscoderOptions,
) -> Option<String> {
    let mode = options.preserve_aspect_ratio?;
    let Some(aspect_ratio) = source.aspect_ratio else {
        debug!(
            "Aspect ratio of {} is unknown, keeping requested resolution",
            source.path.display()
        );
        return None;
    };
    let Some(encoding_options) = spec.as_options_mut() else {
        debug!("Raw encoding options, aspect ratio preservation skipped");
        return None;
    };

    let resolution = match mode {
        AspectRatioMode::Width => {
            let Some(width) = encoding_options.width() else {
                warn!("Cannot preserve aspect ratio by width: no width requested");
                return None;
            };
            let height = even_dimension(f64::from(width) / aspect_ratio)?;
            format!("{width}x{height}")
        }
        AspectRatioMode::Height => {
            let Some(height) = encoding_options.height() else {
                warn!("Cannot preserve aspect ratio by height: no height requested");
                return None;
            };
            let width = even_dimension(f64::from(height) * aspect_ratio)?;
            format!("{width}x{height}")
        }
    };

    debug!("Preserving aspect ratio {aspect_ratio:.4} by {mode}: resolution {resolution}");
    encoding_options.insert("resolution", resolution.clone());
    Some(resolution)
}
