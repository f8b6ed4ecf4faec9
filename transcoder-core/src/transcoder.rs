// ============================================================================
// transcoder-core/src/transcoder.rs
// ============================================================================
//
// TRANSCODER: One supervised ffmpeg run from source to validated output
//
// The Transcoder ties the pieces together. Options are resolved against the
// source once, at construction. `run` then builds the command, supervises
// ffmpeg while relaying progress, validates the artifact and reports either
// the encoded media or a failure carrying the full diagnostic output.
//
// KEY COMPONENTS:
// - Transcoder: orchestrator over a spawner and a prober
// - RunResult: what a successful run produced

// ---- Internal crate imports ----
use crate::config::{TranscoderConfig, TranscoderOptions};
use crate::error::{CoreError, CoreResult};
use crate::external::{
    FfprobeProber, MediaProber, ProcessSpawner, TranscodeCommand, TranscodeSpawner, run_transcode,
};
use crate::media::SourceMedia;
use crate::options::{EncodingSpec, apply_transcoder_options};
use crate::progress_reporting::ProgressEvent;
use crate::validation::validate_outcome;

// ---- External crate imports ----
use log::{error, info};
use once_cell::unsync::OnceCell;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Facts about the encoded file
    pub encoded: SourceMedia,
    /// Validation reasons; empty for a successful run
    pub errors: Vec<String>,
    /// Full diagnostic output of ffmpeg
    pub output: String,
}

/// Transcodes one source into one output file.
///
/// ```rust,no_run
/// use transcoder_core::{SourceMedia, Transcoder, TranscoderOptions};
/// use transcoder_core::options::EncodingSpec;
/// use serde_json::json;
///
/// let source = SourceMedia::new("movie.mov", 7.5).with_aspect_ratio(16.0 / 9.0);
/// let spec = EncodingSpec::from_json(json!({"video_codec": "libx264", "resolution": "640x480"}))?;
/// let mut transcoder = Transcoder::new(source, "movie.mp4", spec, TranscoderOptions::default())?;
///
/// let mut report = |progress: f64| println!("{:.0}%", progress * 100.0);
/// let result = transcoder.run(Some(&mut report))?;
/// println!("encoded {} seconds", result.encoded.duration);
/// # Ok::<(), transcoder_core::CoreError>(())
/// ```
pub struct Transcoder<S = ProcessSpawner, P = FfprobeProber> {
    source: SourceMedia,
    output_path: PathBuf,
    spec: EncodingSpec,
    options: TranscoderOptions,
    errors: Vec<String>,
    encoded: OnceCell<SourceMedia>,
    spawner: S,
    prober: P,
}

impl Transcoder {
    /// Creates a transcoder using ffmpeg and ffprobe from their default locations.
    pub fn new(
        source: SourceMedia,
        output_path: impl Into<PathBuf>,
        spec: impl Into<EncodingSpec>,
        options: TranscoderOptions,
    ) -> CoreResult<Self> {
        Self::with_config(&TranscoderConfig::default(), source, output_path, spec, options)
    }

    /// Creates a transcoder using the binaries named in `config`.
    pub fn with_config(
        config: &TranscoderConfig,
        source: SourceMedia,
        output_path: impl Into<PathBuf>,
        spec: impl Into<EncodingSpec>,
        options: TranscoderOptions,
    ) -> CoreResult<Self> {
        Self::with_tools(
            ProcessSpawner::new(config.ffmpeg_path.clone()),
            FfprobeProber::new(config.ffprobe_path.clone()),
            source,
            output_path,
            spec,
            options,
        )
    }
}

impl<S, P> Transcoder<S, P>
where
    S: TranscodeSpawner,
    P: MediaProber,
{
    /// Creates a transcoder over explicit collaborators.
    ///
    /// The spec is validated and the transcoder options are applied here, so
    /// configuration errors surface before any process exists.
    pub fn with_tools(
        spawner: S,
        prober: P,
        source: SourceMedia,
        output_path: impl Into<PathBuf>,
        spec: impl Into<EncodingSpec>,
        options: TranscoderOptions,
    ) -> CoreResult<Self> {
        let mut spec = spec.into();
        spec.validate()?;
        apply_transcoder_options(&mut spec, &source, &options);

        Ok(Self {
            source,
            output_path: output_path.into(),
            spec,
            options,
            errors: Vec::new(),
            encoded: OnceCell::new(),
            spawner,
            prober,
        })
    }

    /// The command `run` executes.
    pub fn command(&self) -> TranscodeCommand {
        TranscodeCommand::new(
            self.spawner.program(),
            self.source.path(),
            &self.spec,
            &self.output_path,
        )
    }

    /// Runs ffmpeg to completion and validates its output.
    ///
    /// `progress` receives fractions of the source duration as ffmpeg reports
    /// them, then a final `1.0` when the run succeeds.
    ///
    /// # Errors
    ///
    /// * `CoreError::FatalEncoding` - ffmpeg printed a fatal marker; the
    ///   output was not validated
    /// * `CoreError::Validation` - the output failed validation; the reasons
    ///   stay available through [`Transcoder::errors`]
    /// * process errors from spawning or reaping ffmpeg
    pub fn run(
        &mut self,
        mut progress: Option<&mut dyn FnMut(ProgressEvent)>,
    ) -> CoreResult<RunResult> {
        let command = self.command();
        let display = command.to_string();
        info!("Running transcoding...\n{display}\n");

        let supervised = run_transcode(&self.spawner, &command, self.source.duration, |p| {
            if let Some(callback) = progress.as_deref_mut() {
                callback(p);
            }
        })?;

        if self.encoding_succeeded() {
            if let Some(callback) = progress.as_deref_mut() {
                callback(1.0);
            }
            info!(
                "Transcoding of {} to {} succeeded\n",
                self.source.path().display(),
                self.output_path.display()
            );
            Ok(RunResult {
                encoded: self.encoded()?.clone(),
                errors: self.errors.clone(),
                output: supervised.output,
            })
        } else {
            let errors = self.errors.join(", ");
            error!(
                "Failed encoding...\n{display}\n\n{}\nErrors: {errors}\n",
                supervised.output
            );
            Err(CoreError::Validation {
                command: display,
                errors,
                output: supervised.output,
            })
        }
    }

    /// Validates the output file, appending any failure reason to
    /// [`Transcoder::errors`].
    pub fn encoding_succeeded(&mut self) -> bool {
        let outcome = validate_outcome(&self.output_path, &self.source, &self.spec, || {
            self.encoded()
        });
        let passed = outcome.passed();
        self.errors.extend(outcome.errors);
        passed
    }

    /// Probes the output file. The first successful probe is cached.
    pub fn encoded(&self) -> CoreResult<&SourceMedia> {
        self.encoded
            .get_or_try_init(|| self.prober.probe(&self.output_path))
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn spec(&self) -> &EncodingSpec {
        &self.spec
    }

    pub fn source(&self) -> &SourceMedia {
        &self.source
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn options(&self) -> &TranscoderOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AspectRatioMode;
    use crate::external::mocks::{MockProber, MockProcess, MockSpawner};
    use crate::options::EncodingOptions;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        _dir: TempDir,
        output: PathBuf,
        spawner: MockSpawner,
        prober: MockProber,
    }

    fn fixture(file_name: &str) -> Fixture {
        let dir = tempdir().unwrap();
        let output = dir.path().join(file_name);
        Fixture {
            _dir: dir,
            output,
            spawner: MockSpawner::new(),
            prober: MockProber::new(),
        }
    }

    impl Fixture {
        fn transcoder(
            &self,
            source: SourceMedia,
            spec: impl Into<EncodingSpec>,
            options: TranscoderOptions,
        ) -> CoreResult<Transcoder<MockSpawner, MockProber>> {
            Transcoder::with_tools(
                self.spawner.clone(),
                self.prober.clone(),
                source,
                &self.output,
                spec,
                options,
            )
        }
    }

    #[test]
    fn test_successful_run_reports_progress_and_final_event() {
        let fx = fixture("out.mp4");
        fx.spawner.push(
            MockProcess::from_lines(&["Input #0, mov", "frame=10 time=12.5 bitrate=1k"]).creating_output(),
        );
        fx.prober.expect(SourceMedia::new(&fx.output, 25.0));

        let mut transcoder = fx
            .transcoder(SourceMedia::new("/in.mov", 25.0), EncodingSpec::default(), TranscoderOptions::default())
            .unwrap();
        let mut events = Vec::new();
        let mut record = |p: f64| events.push(p);
        let result = transcoder.run(Some(&mut record)).unwrap();

        assert_eq!(events, vec![0.5, 1.0]);
        assert!(result.errors.is_empty());
        assert_eq!(result.encoded.duration, 25.0);
        assert!(result.output.contains("time=12.5"));
        assert_eq!(fx.spawner.calls()[0][..3], ["-y", "-i", "/in.mov"]);
    }

    #[test]
    fn test_fatal_marker_skips_validation() {
        let fx = fixture("out.mp4");
        fx.spawner.push(
            MockProcess::from_lines(&["Unsupported codec with id 98314 for input stream 2"]).creating_output(),
        );

        let mut transcoder = fx
            .transcoder(SourceMedia::new("/in.mov", 10.0), EncodingSpec::default(), TranscoderOptions::default())
            .unwrap();
        let err = transcoder.run(None).unwrap_err();

        assert!(matches!(err, CoreError::FatalEncoding { .. }));
        assert_eq!(fx.prober.calls(), 0);
        assert!(transcoder.errors().is_empty());
    }

    #[test]
    fn test_duration_mismatch_fails_validation() {
        let fx = fixture("out.mp4");
        fx.spawner.push(MockProcess::from_lines(&["time=10.00"]).creating_output());
        fx.prober.expect(SourceMedia::new(&fx.output, 11.5));

        let mut transcoder = fx
            .transcoder(SourceMedia::new("/in.mov", 10.0), EncodingSpec::default(), TranscoderOptions::default())
            .unwrap();
        let mut events = Vec::new();
        let mut record = |p: f64| events.push(p);
        match transcoder.run(Some(&mut record)).unwrap_err() {
            CoreError::Validation { errors, output, command } => {
                assert!(errors.contains("wanted: 10.0sec, got: 11.5sec"));
                assert_eq!(output, "time=10.00\n");
                assert!(command.starts_with("ffmpeg -y -i '/in.mov'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(events, vec![1.0]);
        assert_eq!(transcoder.errors().len(), 1);
    }

    #[test]
    fn test_clock_form_cap_uses_capped_window() {
        let fx = fixture("out.mp4");
        fx.spawner.push(MockProcess::from_lines(&["time=5.00"]).creating_output());
        fx.prober.expect(SourceMedia::new(&fx.output, 5.0));

        let spec = EncodingOptions::new().with("duration", "00:00:05");
        let mut transcoder = fx
            .transcoder(SourceMedia::new("/in.mov", 60.0), spec, TranscoderOptions::default())
            .unwrap();
        let result = transcoder.run(None).unwrap();

        assert!(result.errors.is_empty());
        assert_eq!(fx.spawner.calls()[0][3..5], ["-t", "00:00:05"]);
    }

    #[test]
    fn test_missing_output_fails_without_probing() {
        let fx = fixture("out.mp4");
        fx.spawner.push(MockProcess::from_lines(&["Conversion failed!"]).with_exit_code(Some(1)));

        let mut transcoder = fx
            .transcoder(SourceMedia::new("/in.mov", 10.0), EncodingSpec::default(), TranscoderOptions::default())
            .unwrap();
        let err = transcoder.run(None).unwrap_err();

        assert!(err.to_string().starts_with("Failed encoding. Errors: no output file created. Full output:"));
        assert_eq!(transcoder.errors(), ["no output file created"]);
        assert_eq!(fx.prober.calls(), 0);
    }

    #[test]
    fn test_encoded_is_probed_once() {
        let fx = fixture("out.mp4");
        fx.spawner.push(MockProcess::from_lines(&["time=5.00"]).creating_output());
        fx.prober.expect(SourceMedia::new(&fx.output, 5.0));

        let mut transcoder = fx
            .transcoder(SourceMedia::new("/in.mov", 5.0), EncodingSpec::default(), TranscoderOptions::default())
            .unwrap();
        transcoder.run(None).unwrap();

        let first = transcoder.encoded().unwrap().clone();
        let second = transcoder.encoded().unwrap();
        assert_eq!(&first, second);
        assert_eq!(fx.prober.calls(), 1);
    }

    #[test]
    fn test_invalid_spec_is_rejected_before_spawning() {
        let fx = fixture("out.mp4");
        let result = fx.transcoder(
            SourceMedia::new("/in.mov", 10.0),
            "-vf 'scale=320:240",
            TranscoderOptions::default(),
        );
        assert!(matches!(result, Err(CoreError::Config(_))));
        assert!(fx.spawner.calls().is_empty());
    }

    #[test]
    fn test_aspect_ratio_is_preserved_in_command() {
        let fx = fixture("out.mp4");
        let source = SourceMedia::new("/in.mov", 10.0).with_aspect_ratio(16.0 / 9.0);
        let spec = EncodingOptions::new().with("resolution", "320x240");
        let transcoder = fx
            .transcoder(source, spec, TranscoderOptions::default().preserve_aspect_ratio(AspectRatioMode::Width))
            .unwrap();

        let args = transcoder.command().encoding_args().to_vec();
        assert_eq!(args[..2], ["-s", "320x180"]);
        assert_eq!(
            transcoder.spec().as_options().and_then(EncodingOptions::resolution),
            Some("320x180")
        );
    }

    #[test]
    fn test_still_image_output_ignores_duration() {
        let fx = fixture("thumb.png");
        fx.spawner.push(MockProcess::from_lines(&["frame=1"]).creating_output());
        fx.prober.expect(SourceMedia::new(&fx.output, 0.04));

        let spec = EncodingOptions::new().with("screenshot", true).with("seek_time", 3);
        let mut transcoder = fx
            .transcoder(SourceMedia::new("/in.mov", 10.0), spec, TranscoderOptions::default())
            .unwrap();
        assert!(transcoder.run(None).is_ok());
    }
}
