// transcoder-cli/src/config.rs
//
// Default configuration for the `transcoder` binary and the translation of
// command-line arguments into core configuration.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use transcoder_core::options::EncodingSpec;
use transcoder_core::{CoreError, TranscoderConfig, TranscoderOptions};

use crate::cli::EncodeArgs;
use crate::error::{CliErrorContext, CliResult};

/// Environment variable naming the ffmpeg executable.
pub const FFMPEG_ENV: &str = "TRANSCODER_FFMPEG";

/// Environment variable naming the ffprobe executable.
pub const FFPROBE_ENV: &str = "TRANSCODER_FFPROBE";

/// Binary locations: flags (or their environment variables) override the
/// core defaults.
pub fn tool_config(ffmpeg: Option<&PathBuf>, ffprobe: Option<&PathBuf>) -> TranscoderConfig {
    let mut config = TranscoderConfig::default();
    if let Some(ffmpeg) = ffmpeg {
        config.ffmpeg_path = ffmpeg.clone();
    }
    if let Some(ffprobe) = ffprobe {
        config.ffprobe_path = ffprobe.clone();
    }
    config
}

/// Builds the encoding spec from `--options`, `--options-file` or `--raw`.
///
/// No option source at all means an empty set of options, i.e. ffmpeg's
/// defaults for the output container.
pub fn encoding_spec(args: &EncodeArgs) -> CliResult<EncodingSpec> {
    if let Some(raw) = &args.raw {
        let spec = EncodingSpec::from(raw.as_str());
        spec.validate()?;
        return Ok(spec);
    }

    let json = match (&args.options, &args.options_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .cli_with_context(|| format!("Failed to read options file '{}'", path.display()))?,
        (None, None) => return Ok(EncodingSpec::default()),
    };

    let value: Value = serde_json::from_str(&json)
        .map_err(|e| CoreError::Config(format!("Encoding options are not valid JSON: {e}")))?;
    EncodingSpec::from_json(value)
}

pub fn transcoder_options(args: &EncodeArgs) -> TranscoderOptions {
    TranscoderOptions {
        preserve_aspect_ratio: args.preserve_aspect_ratio,
    }
}
