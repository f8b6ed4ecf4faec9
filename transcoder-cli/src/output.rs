// transcoder-cli/src/output.rs
//
// Terminal presentation: the encode progress bar and the result summaries.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::io::IsTerminal;
use std::time::Duration;

use transcoder_core::SourceMedia;

/// Progress bar resolution: one tick per 0.1%.
const PROGRESS_TICKS: u64 = 1000;

/// Print a section heading with colored styling
pub fn print_section(text: &str) {
    let line = "-".repeat(40);
    println!("\n{}", line.blue());
    println!("{}", format!(" {text} ").bold());
    println!("{}", line.blue());
}

/// Print an info line with label and value, with the label colored
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("{:<14} {}", format!("{label}:").bright_cyan(), value);
}

/// Whether a progress bar would be visible.
pub fn progress_bar_visible(no_progress: bool) -> bool {
    !no_progress && std::io::stderr().is_terminal()
}

/// Creates the encode progress bar, hidden when `visible` is false.
pub fn encode_progress_bar(visible: bool) -> ProgressBar {
    let pb = ProgressBar::new(PROGRESS_TICKS);
    if !visible {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }

    match ProgressStyle::default_bar()
        .template("  ⧖ Encoding: {percent:>3}% [{bar:30}] ({elapsed_precise} / {eta_precise})")
    {
        Ok(style) => pb.set_style(style.progress_chars("##.")),
        Err(e) => log::debug!("Falling back to default progress style: {e}"),
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Moves the bar to `fraction` of the way. Values above 1.0 are shown as done.
pub fn set_progress(pb: &ProgressBar, fraction: f64) {
    pb.set_position(progress_position(fraction));
}

fn progress_position(fraction: f64) -> u64 {
    if !fraction.is_finite() || fraction <= 0.0 {
        return 0;
    }
    ((fraction.min(1.0) * PROGRESS_TICKS as f64).round() as u64).min(PROGRESS_TICKS)
}

/// Prints the facts about a probed file.
pub fn print_media(media: &SourceMedia) {
    print_section(&media.path.display().to_string());
    let duration = if media.duration_uncertain {
        format!("{:.3}s {}", media.duration, "(estimated)".yellow())
    } else {
        format!("{:.3}s", media.duration)
    };
    print_info("Duration", duration);
    print_info(
        "Valid",
        if media.valid {
            "yes".green().to_string()
        } else {
            "no".bright_red().to_string()
        },
    );
    if let Some(resolution) = media.resolution() {
        print_info("Resolution", resolution);
    }
    if let Some(aspect_ratio) = media.aspect_ratio {
        print_info("Aspect ratio", format!("{aspect_ratio:.4}"));
    }
    if let Some(codec) = &media.video_codec {
        print_info("Video codec", codec);
    }
    if let Some(codec) = &media.audio_codec {
        print_info("Audio codec", codec);
    }
}
