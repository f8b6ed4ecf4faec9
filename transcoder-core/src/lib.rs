//! Core library for supervised ffmpeg transcoding.
//!
//! This crate runs a single ffmpeg transcode, relays its progress while it
//! runs, aborts on fatal encoder output, and validates the resulting file
//! against the source (existence, validity, duration tolerance). Requested
//! resolutions can be adjusted to keep the source aspect ratio.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use transcoder_core::{
//!     AspectRatioMode, FfprobeProber, MediaProber, Transcoder, TranscoderOptions,
//! };
//! use transcoder_core::options::EncodingSpec;
//! use serde_json::json;
//! use std::path::Path;
//!
//! let source = FfprobeProber::default().probe(Path::new("/path/to/movie.mov"))?;
//! let spec = EncodingSpec::from_json(json!({
//!     "video_codec": "libx264",
//!     "resolution": "640x480",
//!     "audio_bitrate": 128,
//! }))?;
//! let options = TranscoderOptions::default().preserve_aspect_ratio(AspectRatioMode::Width);
//!
//! let mut transcoder = Transcoder::new(source, "/path/to/movie.mp4", spec, options)?;
//! let result = transcoder.run(Some(&mut |progress: f64| println!("{:.1}%", progress * 100.0)))?;
//! println!("Encoded {:.2}s", result.encoded.duration);
//! # Ok::<(), transcoder_core::CoreError>(())
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod media;
pub mod options;
pub mod progress_reporting;
pub mod transcoder;
pub mod utils;
pub mod validation;

// Re-exports for public API
pub use config::{AspectRatioMode, TranscoderConfig, TranscoderOptions};
pub use error::{CoreError, CoreResult};
pub use external::{FfprobeProber, MediaProber, ProcessSpawner, check_dependency};
pub use media::SourceMedia;
pub use options::{EncodingOptions, EncodingSpec};
pub use progress_reporting::ProgressEvent;
pub use transcoder::{RunResult, Transcoder};
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};
