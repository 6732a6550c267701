//! Spinner-based progress reporting for terminal output

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::ports::ProgressObserver;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Indeterminate spinner that tracks continuation rounds.
///
/// Hidden mode keeps the observer wiring identical when output must
/// stay machine-readable.
pub struct SpinnerProgress {
    spinner: ProgressBar,
}

impl SpinnerProgress {
    pub fn new(visible: bool) -> Self {
        let spinner = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
            spinner.set_style(style.tick_chars(SPINNER_CHARS));
        }
        spinner.set_message("Generating response...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressObserver for SpinnerProgress {
    fn on_continuation(&self, attempt: u32, max_attempts: u32) {
        self.spinner.set_message(format!(
            "Continuing response... attempt {attempt}/{max_attempts}"
        ));
    }
}
