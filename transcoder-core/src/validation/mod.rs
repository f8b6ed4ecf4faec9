//! Outcome validation
//!
//! After ffmpeg has exited, the run is judged by its artifact alone: the
//! output file must exist, the prober must accept it as a media file, and its
//! duration must fall within the tolerance window derived from the source
//! (see [`duration`]). Checks short-circuit on the first failure.

pub mod duration;

pub use duration::{DurationWindow, should_validate_duration, validate_duration};

use crate::error::CoreResult;
use crate::media::SourceMedia;
use crate::options::EncodingSpec;

use log::{debug, warn};

use std::path::Path;

pub const NO_OUTPUT_FILE: &str = "no output file created";
pub const INVALID_OUTPUT_FILE: &str = "encoded file is invalid";

/// Reasons a run failed validation, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            errors: vec![reason.into()],
        }
    }
}

/// Validates the artifact at `output_path`.
///
/// `probe_encoded` is only called once the file is known to exist. A probe
/// error counts as an invalid file.
pub fn validate_outcome<'a, F>(
    output_path: &Path,
    source: &SourceMedia,
    spec: &EncodingSpec,
    probe_encoded: F,
) -> ValidationOutcome
where
    F: FnOnce() -> CoreResult<&'a SourceMedia>,
{
    if !output_path.exists() {
        debug!("Output file {} does not exist", output_path.display());
        return ValidationOutcome::failed(NO_OUTPUT_FILE);
    }

    let encoded = match probe_encoded() {
        Ok(encoded) if encoded.valid => encoded,
        Ok(_) => return ValidationOutcome::failed(INVALID_OUTPUT_FILE),
        Err(err) => {
            warn!("Probing {} failed: {err}", output_path.display());
            return ValidationOutcome::failed(INVALID_OUTPUT_FILE);
        }
    };

    if should_validate_duration(source, output_path, spec) {
        if let Some(reason) = validate_duration(source, spec, encoded.duration) {
            return ValidationOutcome::failed(reason);
        }
    }

    ValidationOutcome::default()
}
