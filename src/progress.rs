//! Spinners for the network steps

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(80);
const TICK_STRINGS: &[&str] = &[
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓",
];

/// A spinner that stays silent in quiet mode
pub struct Spinner {
    bar: ProgressBar,
    quiet: bool,
}

/// Start a spinner with a message
pub fn spinner(msg: &str, quiet: bool) -> Spinner {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICK_STRINGS),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(TICK);
        pb
    };
    Spinner { bar, quiet }
}

/// Finish a spinner with a success line
pub fn finish_success(spinner: &Spinner, msg: &str) {
    spinner.bar.finish_and_clear();
    if !spinner.quiet {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Finish a spinner with an error line
pub fn finish_error(spinner: &Spinner, msg: &str) {
    spinner.bar.finish_and_clear();
    eprintln!("{} {}", "✗".red(), msg);
}
