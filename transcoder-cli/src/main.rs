// transcoder-cli/src/main.rs
//
// Entry point of the `transcoder` binary: parses arguments, installs the
// logger, dispatches to the command and maps failures to exit code 1.

use clap::Parser;
use owo_colors::OwoColorize;
use std::process;

use transcoder_cli::output::progress_bar_visible;
use transcoder_cli::{Cli, CliResult, Commands, logging, run_encode, run_probe};

fn main() {
    let cli = Cli::parse();

    let progress_bar = matches!(&cli.command, Commands::Encode(args) if progress_bar_visible(args.no_progress));
    logging::init(cli.verbose, progress_bar);

    if let Err(e) = run(cli) {
        log::debug!("Command failed: {e:?}");
        eprintln!("{} {e}", "Error:".bright_red().bold());
        process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Encode(args) => run_encode(args).map(|_| ()),
        Commands::Probe(args) => run_probe(&args).map(|_| ()),
    }
}
