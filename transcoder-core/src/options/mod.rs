// ============================================================================
// transcoder-core/src/options/mod.rs
// ============================================================================
//
// ENCODING OPTIONS: What ffmpeg is asked to do between input and output
//
// An encoding specification is either an opaque, pre-formatted argument
// string or a structured map of named options. Structured options can be
// inspected (requested resolution, duration cap) and adjusted by the option
// resolver before the command is built; raw strings are passed through as-is.
//
// KEY COMPONENTS:
// - EncodingSpec: raw string or structured options
// - EncodingOptions: structured options and their ffmpeg rendering
// - resolver: aspect-ratio preserving resolution

pub mod encoding;
pub mod resolver;

pub use encoding::EncodingOptions;
pub use resolver::{apply_transcoder_options, even_dimension};

use crate::error::{CoreError, CoreResult};

use serde_json::Value;

use std::collections::BTreeMap;
use std::fmt;

/// The encoding arguments placed between the input and the output path.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingSpec {
    /// A pre-formatted argument string, tokenised with shell rules.
    Raw(String),
    /// Named options rendered by [`EncodingOptions::to_args`].
    Options(EncodingOptions),
}

impl EncodingSpec {
    /// Interprets a JSON value as an encoding specification.
    ///
    /// A string becomes [`EncodingSpec::Raw`], an object becomes
    /// [`EncodingSpec::Options`]. Any other value type is a configuration error.
    ///
    /// ```rust
    /// use serde_json::json;
    /// use transcoder_core::options::EncodingSpec;
    ///
    /// assert!(EncodingSpec::from_json(json!("-vcodec libx264")).is_ok());
    /// assert!(EncodingSpec::from_json(json!({"video_codec": "libx264"})).is_ok());
    /// assert!(EncodingSpec::from_json(json!(42)).is_err());
    /// ```
    pub fn from_json(value: Value) -> CoreResult<Self> {
        let spec = match value {
            Value::String(raw) => Self::Raw(raw),
            Value::Object(map) => Self::Options(map.into_iter().collect()),
            other => {
                return Err(CoreError::Config(format!(
                    "Unknown options format '{}', should be either a string or an object of options",
                    json_type_name(&other)
                )));
            }
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks that the specification can be turned into an argument vector.
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            Self::Raw(raw) => {
                if shlex::split(raw).is_none() {
                    return Err(CoreError::Config(format!(
                        "Raw options are not a valid argument string: {raw}"
                    )));
                }
                Ok(())
            }
            Self::Options(options) => options.validate(),
        }
    }

    /// The argument vector passed to ffmpeg.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::Raw(raw) => encoding::tokenize(raw),
            Self::Options(options) => options.to_args(),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    pub fn as_options(&self) -> Option<&EncodingOptions> {
        match self {
            Self::Options(options) => Some(options),
            Self::Raw(_) => None,
        }
    }

    pub fn as_options_mut(&mut self) -> Option<&mut EncodingOptions> {
        match self {
            Self::Options(options) => Some(options),
            Self::Raw(_) => None,
        }
    }

    /// Requested duration cap; always `None` for raw strings.
    pub fn duration_cap(&self) -> Option<f64> {
        self.as_options().and_then(EncodingOptions::duration)
    }
}

impl Default for EncodingSpec {
    fn default() -> Self {
        Self::Options(EncodingOptions::default())
    }
}

impl From<String> for EncodingSpec {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<&str> for EncodingSpec {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<EncodingOptions> for EncodingSpec {
    fn from(options: EncodingOptions) -> Self {
        Self::Options(options)
    }
}

impl From<BTreeMap<String, Value>> for EncodingSpec {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self::Options(map.into())
    }
}

/// The flat argument string as it appears in the logged command.
impl fmt::Display for EncodingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(raw) => write!(f, "{raw}"),
            Self::Options(options) => write!(f, "{options}"),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_accepts_string_and_object() {
        let raw = EncodingSpec::from_json(json!("-vcodec libx264 -t 5")).unwrap();
        assert!(raw.is_raw());
        assert_eq!(raw.to_args(), vec!["-vcodec", "libx264", "-t", "5"]);
        assert_eq!(raw.duration_cap(), None);

        let structured = EncodingSpec::from_json(json!({"duration": 5, "video_codec": "libx264"})).unwrap();
        assert!(!structured.is_raw());
        assert_eq!(structured.duration_cap(), Some(5.0));
        assert_eq!(structured.to_args(), vec!["-vcodec", "libx264", "-t", "5"]);
    }

    #[test]
    fn test_from_json_rejects_other_types() {
        for value in [json!(42), json!(true), json!(null), json!(["-an"])] {
            match EncodingSpec::from_json(value) {
                Err(CoreError::Config(msg)) => assert!(msg.contains("Unknown options format")),
                other => panic!("expected configuration error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_json_rejects_unbalanced_raw_string() {
        assert!(matches!(
            EncodingSpec::from_json(json!("-vf 'scale=2:2")),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_raw_display_is_verbatim() {
        let spec = EncodingSpec::from("-vcodec  copy");
        assert_eq!(spec.to_string(), "-vcodec  copy");
        assert_eq!(spec.to_args(), vec!["-vcodec", "copy"]);
    }

    #[test]
    fn test_default_is_empty_options() {
        let spec = EncodingSpec::default();
        assert!(spec.as_options().is_some_and(EncodingOptions::is_empty));
        assert_eq!(spec.to_string(), "");
    }
}
