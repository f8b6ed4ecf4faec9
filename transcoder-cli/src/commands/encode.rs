//! Implementation of the 'encode' subcommand.
//!
//! Turns the command-line arguments into an encoding spec and tool
//! configuration, probes the source, and runs the transcoder with a live
//! progress bar.

use crate::cli::EncodeArgs;
use crate::config::{encoding_spec, tool_config, transcoder_options};
use crate::error::{CliErrorContext, CliResult};
use crate::output::{encode_progress_bar, print_info, print_section, progress_bar_visible, set_progress};

use transcoder_core::{
    CoreError, FfprobeProber, MediaProber, RunResult, Transcoder, check_dependency, format_bytes,
    format_duration,
};

use std::fs;
use std::time::Instant;

use log::{debug, info};

/// Runs the encode command.
pub fn run_encode(args: EncodeArgs) -> CliResult<RunResult> {
    let start_time = Instant::now();

    // Configuration problems surface before anything touches the filesystem.
    let spec = encoding_spec(&args)?;
    let options = transcoder_options(&args);
    let config = tool_config(args.ffmpeg.as_ref(), args.ffprobe.as_ref());
    debug!("Encoding options: {spec}");

    if !args.input_path.is_file() {
        return Err(CoreError::InputNotFound(args.input_path.clone()));
    }
    check_dependency(&config.ffmpeg_path)?;
    check_dependency(&config.ffprobe_path)?;

    let source = FfprobeProber::new(config.ffprobe_path.clone())
        .probe(&args.input_path)
        .cli_with_context(|| format!("Failed to probe '{}'", args.input_path.display()))?;
    if !source.valid {
        return Err(CoreError::OperationFailed(format!(
            "Input file '{}' is not a valid media file",
            args.input_path.display()
        )));
    }
    info!(
        "Source: {} ({})",
        args.input_path.display(),
        format_duration(source.duration)
    );

    let mut transcoder = Transcoder::with_config(&config, source, &args.output_path, spec, options)?;

    let pb = encode_progress_bar(progress_bar_visible(args.no_progress));
    let mut on_progress = |fraction: f64| set_progress(&pb, fraction);
    let result = transcoder.run(Some(&mut on_progress));
    pb.finish_and_clear();
    let result = result?;

    print_summary(&args, &result, start_time);
    Ok(result)
}

fn print_summary(args: &EncodeArgs, result: &RunResult, start_time: Instant) {
    print_section("Encode complete");
    print_info("Output", args.output_path.display());
    print_info("Duration", format!("{:.2}s", result.encoded.duration));
    match fs::metadata(&args.output_path) {
        Ok(metadata) => print_info("Size", format_bytes(metadata.len())),
        Err(e) => debug!("Could not stat {}: {e}", args.output_path.display()),
    }
    print_info("Elapsed", format_duration(start_time.elapsed().as_secs_f64()));
}
