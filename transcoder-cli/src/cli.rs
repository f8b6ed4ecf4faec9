// transcoder-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use transcoder_core::AspectRatioMode;

use crate::config::{FFMPEG_ENV, FFPROBE_ENV};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Transcoder: supervised ffmpeg transcoding",
    long_about = "Runs ffmpeg on a single file with live progress, aborts on fatal encoder \
                  output and validates the encoded file against the source."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging, including every ffmpeg diagnostic line.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcodes one input file into one output file
    Encode(EncodeArgs),
    /// Prints the facts ffprobe reports about a media file
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Source media file
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT")]
    pub input_path: PathBuf,

    /// Encoded output file; its extension selects the container
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT")]
    pub output_path: PathBuf,

    /// Encoding options as JSON: an object of named options
    /// (e.g. '{"video_codec":"libx264","resolution":"640x360"}') or a string
    /// of raw ffmpeg arguments
    #[arg(long, value_name = "JSON", group = "encoding")]
    pub options: Option<String>,

    /// Read the encoding options JSON from a file
    #[arg(long, value_name = "PATH", group = "encoding")]
    pub options_file: Option<PathBuf>,

    /// Raw ffmpeg arguments placed between input and output
    #[arg(long, value_name = "ARGS", group = "encoding", allow_hyphen_values = true)]
    pub raw: Option<String>,

    /// Keep the source aspect ratio by recomputing the other dimension of the
    /// requested resolution (width|height)
    #[arg(long, value_name = "MODE", value_parser = parse_aspect_ratio_mode)]
    pub preserve_aspect_ratio: Option<AspectRatioMode>,

    /// ffmpeg executable
    #[arg(long, value_name = "PATH", env = FFMPEG_ENV)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe executable
    #[arg(long, value_name = "PATH", env = FFPROBE_ENV)]
    pub ffprobe: Option<PathBuf>,

    /// Do not draw a progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to probe
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    /// ffprobe executable
    #[arg(long, value_name = "PATH", env = FFPROBE_ENV)]
    pub ffprobe: Option<PathBuf>,

    /// Print the facts as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

fn parse_aspect_ratio_mode(value: &str) -> Result<AspectRatioMode, String> {
    value.parse().map_err(|e: transcoder_core::CoreError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_encode_args() {
        let cli = Cli::try_parse_from([
            "transcoder",
            "encode",
            "-i",
            "in.mov",
            "-o",
            "out.mp4",
            "--options",
            r#"{"video_codec":"libx264"}"#,
            "--preserve-aspect-ratio",
            "height",
        ])
        .unwrap();
        let Commands::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.input_path, PathBuf::from("in.mov"));
        assert_eq!(args.preserve_aspect_ratio, Some(AspectRatioMode::Height));
        assert!(args.raw.is_none());
    }

    #[test]
    fn test_raw_accepts_leading_hyphen() {
        let cli = Cli::try_parse_from([
            "transcoder", "encode", "-i", "a", "-o", "b", "--raw", "-vcodec copy",
        ])
        .unwrap();
        let Commands::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.raw.as_deref(), Some("-vcodec copy"));
    }

    #[test]
    fn test_option_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "transcoder", "encode", "-i", "a", "-o", "b", "--options", "{}", "--raw", "-an",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_aspect_mode_is_rejected() {
        let result = Cli::try_parse_from([
            "transcoder", "encode", "-i", "a", "-o", "b", "--preserve-aspect-ratio", "diagonal",
        ]);
        assert!(result.is_err());
    }
}
