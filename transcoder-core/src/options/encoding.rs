//! Structured encoding options and their rendering to ffmpeg arguments.
//!
//! `EncodingOptions` is an ordered map of option name to scalar value. Only
//! the names listed in [`OPTION_FLAGS`] are rendered; anything else (including
//! the `width`/`height` helpers) is kept for resolution but never passed to
//! ffmpeg.

use crate::error::{CoreError, CoreResult};
use crate::utils::parse_ffmpeg_time;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::BTreeMap;
use std::fmt;

/// How a recognised option is turned into arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Render {
    /// `<flag> <value>`
    Flag(&'static str),
    /// `<flag> <value>k`, the `k` suffix added only when missing
    Bitrate(&'static str),
    /// `-vframes 1 -f image2` when true
    Screenshot,
    /// value is a shell-style argument string, tokenised and passed through
    Custom,
}

/// Recognised options in rendering order: codecs first, presets next so they
/// can be matched against the codecs, everything else after so it overrides
/// preset values, `custom` last.
const OPTION_FLAGS: &[(&str, Render)] = &[
    ("video_codec", Render::Flag("-vcodec")),
    ("audio_codec", Render::Flag("-acodec")),
    ("video_preset", Render::Flag("-vpre")),
    ("audio_preset", Render::Flag("-apre")),
    ("file_preset", Render::Flag("-fpre")),
    ("x264_vprofile", Render::Flag("-vprofile")),
    ("x264_preset", Render::Flag("-preset")),
    ("frame_rate", Render::Flag("-r")),
    ("resolution", Render::Flag("-s")),
    ("aspect", Render::Flag("-aspect")),
    ("video_bitrate", Render::Bitrate("-b:v")),
    ("video_max_bitrate", Render::Bitrate("-maxrate")),
    ("video_min_bitrate", Render::Bitrate("-minrate")),
    ("buffer_size", Render::Bitrate("-bufsize")),
    ("video_bitrate_tolerance", Render::Bitrate("-bt")),
    ("audio_bitrate", Render::Bitrate("-b:a")),
    ("audio_sample_rate", Render::Flag("-ar")),
    ("audio_channels", Render::Flag("-ac")),
    ("threads", Render::Flag("-threads")),
    ("keyframe_interval", Render::Flag("-g")),
    ("seek_time", Render::Flag("-ss")),
    ("duration", Render::Flag("-t")),
    ("screenshot", Render::Screenshot),
    ("custom", Render::Custom),
];

/// Structured encoding options, e.g. `{"video_codec": "libx264", "resolution": "640x360"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingOptions {
    entries: BTreeMap<String, Value>,
}

impl EncodingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, replacing any previous value. Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets an option, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `resolution` value, e.g. `"640x360"`.
    pub fn resolution(&self) -> Option<&str> {
        self.get("resolution").and_then(Value::as_str)
    }

    /// Requested width: the `width` option, else the first half of `resolution`.
    pub fn width(&self) -> Option<u32> {
        self.get("width")
            .and_then(value_as_u32)
            .or_else(|| self.resolution_part(0))
    }

    /// Requested height: the `height` option, else the second half of `resolution`.
    pub fn height(&self) -> Option<u32> {
        self.get("height")
            .and_then(value_as_u32)
            .or_else(|| self.resolution_part(1))
    }

    /// Requested duration cap in seconds. Accepts plain seconds and ffmpeg's
    /// clock form, `[HH:]MM:SS[.m...]`.
    pub fn duration(&self) -> Option<f64> {
        self.get("duration").and_then(value_as_seconds)
    }

    fn resolution_part(&self, index: usize) -> Option<u32> {
        self.resolution()?
            .split('x')
            .nth(index)
            .and_then(|part| part.trim().parse().ok())
    }

    /// Aspect ratio implied by `resolution`, appended as `-aspect` unless an
    /// explicit `aspect` option is present.
    fn implied_aspect(&self) -> Option<f64> {
        if self.contains_key("aspect") {
            return None;
        }
        let width = self.resolution_part(0)?;
        let height = self.resolution_part(1)?;
        (height > 0).then(|| f64::from(width) / f64::from(height))
    }

    /// Checks that every value is a scalar and that `custom` can be tokenised.
    pub fn validate(&self) -> CoreResult<()> {
        for (key, value) in &self.entries {
            if value.is_array() || value.is_object() {
                return Err(CoreError::Config(format!(
                    "Option '{key}' must be a string, number or boolean, got {value}"
                )));
            }
        }
        if let Some(value) = self.get("duration") {
            if scalar_text(value).is_some() && self.duration().is_none() {
                return Err(CoreError::Config(format!(
                    "Option 'duration' must be seconds or [HH:]MM:SS[.ms], got {value}"
                )));
            }
        }
        if let Some(custom) = self.get("custom").and_then(Value::as_str) {
            if shlex::split(custom).is_none() {
                return Err(CoreError::Config(format!(
                    "Option 'custom' is not a valid argument string: {custom}"
                )));
            }
        }
        Ok(())
    }

    /// Renders the options as an ffmpeg argument vector.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for &(key, render) in OPTION_FLAGS {
            let Some(value) = self.get(key) else {
                continue;
            };
            if key == "custom" {
                if let Some(aspect) = self.implied_aspect() {
                    args.extend(["-aspect".to_string(), aspect.to_string()]);
                }
            }
            let Some(text) = scalar_text(value) else {
                continue;
            };
            match render {
                Render::Flag(flag) => args.extend([flag.to_string(), text]),
                Render::Bitrate(flag) => args.extend([flag.to_string(), kilo_format(text)]),
                Render::Screenshot => {
                    if value.as_bool() == Some(true) {
                        args.extend(["-vframes", "1", "-f", "image2"].map(String::from));
                    }
                }
                Render::Custom => args.extend(tokenize(&text)),
            }
        }
        if !self.contains_key("custom") {
            if let Some(aspect) = self.implied_aspect() {
                args.extend(["-aspect".to_string(), aspect.to_string()]);
            }
        }
        args
    }
}

impl From<BTreeMap<String, Value>> for EncodingOptions {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for EncodingOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// The flat argument string, with values quoted where the shell would need it.
impl fmt::Display for EncodingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self
            .to_args()
            .into_iter()
            .map(|arg| match shlex::try_quote(&arg) {
                Ok(quoted) => quoted.into_owned(),
                Err(_) => arg,
            })
            .collect();
        write!(f, "{}", quoted.join(" "))
    }
}

/// Splits a shell-style argument string. Input is validated at construction;
/// anything unbalanced that slips through falls back to whitespace splitting.
pub(crate) fn tokenize(args: &str) -> Vec<String> {
    shlex::split(args)
        .unwrap_or_else(|| args.split_whitespace().map(String::from).collect())
}

/// Text form of a scalar value; `None` for null, `false` and containers.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn kilo_format(value: String) -> String {
    if value.contains('k') {
        value
    } else {
        format!("{value}k")
    }
}

fn value_as_seconds(value: &Value) -> Option<f64> {
    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            match s.matches(':').count() {
                0 => s.parse().ok(),
                1 => parse_ffmpeg_time(&format!("00:{s}")),
                _ => parse_ffmpeg_time(s),
            }
        }
        _ => None,
    };
    seconds.filter(|secs| secs.is_finite() && *secs >= 0.0)
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
