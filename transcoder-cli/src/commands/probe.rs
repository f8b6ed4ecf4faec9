//! Implementation of the 'probe' subcommand.

use crate::cli::ProbeArgs;
use crate::config::tool_config;
use crate::error::{CliErrorContext, CliResult};
use crate::output::print_media;

use transcoder_core::{FfprobeProber, MediaProber, SourceMedia};

/// Probes one file and prints what ffprobe reports about it.
pub fn run_probe(args: &ProbeArgs) -> CliResult<SourceMedia> {
    let config = tool_config(None, args.ffprobe.as_ref());
    let media = FfprobeProber::new(config.ffprobe_path)
        .probe(&args.file)
        .cli_context("Failed to probe media file")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&media)?);
    } else {
        print_media(&media);
    }
    Ok(media)
}
