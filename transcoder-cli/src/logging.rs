// ============================================================================
// transcoder-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger setup for the transcoder binary
//
// The core library only talks to the `log` facade. This module decides where
// its records go: stderr, one line per record, with a local timestamp and a
// colored level.
//
// USAGE:
// - RUST_LOG=info (default): command, success and coarse progress
// - RUST_LOG=debug or --verbose: every ffmpeg diagnostic line
//   (target "ffmpeg_log") and the probe results

use log::LevelFilter;
use owo_colors::OwoColorize;
use std::io::Write;

/// Target of the coarse "every 10%" progress records.
const PROGRESS_TARGET: &str = "transcoder::progress";

/// Installs the global logger.
///
/// `RUST_LOG` is respected; `verbose` forces debug. While a progress bar is
/// drawn the coarse progress records are silenced so they do not tear it.
pub fn init(verbose: bool, progress_bar: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    if progress_bar {
        builder.filter_module(PROGRESS_TARGET, LevelFilter::Warn);
    }

    builder.format(|buf, record| {
        let level = match record.level() {
            log::Level::Error => "ERROR".bright_red().to_string(),
            log::Level::Warn => "WARN ".yellow().to_string(),
            log::Level::Info => "INFO ".green().to_string(),
            log::Level::Debug => "DEBUG".blue().to_string(),
            log::Level::Trace => "TRACE".magenta().to_string(),
        };
        writeln!(buf, "{} {} {}", get_log_timestamp().dimmed(), level, record.args())
    });

    // A logger may already be installed when running under a test harness.
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Returns the current local time formatted for log lines, e.g.
/// "2024-06-01 12:30:45".
pub fn get_log_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
