//! Media facts consumed by the transcoder.
//!
//! The prober in `external::ffprobe_executor` produces these facts for both
//! the source file and the encoded output.

pub mod source;

// Re-export commonly used types
pub use source::SourceMedia;
