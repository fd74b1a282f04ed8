// ============================================================================
// reelsmith-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: indicatif Bar Fed by the Core Progress Callback
//
// The core reports `(percent, line)` pairs. Lines with a percentage move the
// bar; lines without one (diagnostics, retry notices) only update the
// message when they look like a notice.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.green} Encoding [{bar:40.cyan/blue}] {percent:>3}% ({eta}) {msg}";

/// Terminal progress bar for one build.
pub struct BuildProgress {
    bar: ProgressBar,
}

impl BuildProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        // The template is a constant; fall back to the default style if it is rejected.
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .map(|s| s.progress_chars("█▓▒░ "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// A bar that draws nothing, for tests and non-interactive runs.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Handles one callback from the core.
    pub fn update(&self, percent: Option<f64>, line: &str) {
        match percent {
            Some(percent) => self.bar.set_position(bar_position(percent)),
            None if line.contains("retrying") => {
                self.bar.set_position(0);
                self.bar.set_message(line.to_string());
            }
            None => {}
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl Default for BuildProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_position(percent: f64) -> u64 {
    percent.clamp(0.0, 100.0).round() as u64
}
