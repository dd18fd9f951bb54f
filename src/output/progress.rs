//! Progress reporting functionality
//!
//! A spinner on stderr that counts modules while addon paths are scanned.
//! Disabled reporters do nothing, so callers never need to branch on it.

use crate::models::module::Module;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} modules {msg}";

/// Progress reporter for scans
pub struct ProgressReporter {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create a new progress reporter; `enabled` is false in quiet mode
    /// or when progress display was switched off
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start a spinner for a new operation
    pub fn start(&mut self, operation: &str) {
        if !self.enabled {
            return;
        }

        let style = ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let spinner = ProgressBar::new_spinner().with_style(style);
        spinner.set_message(operation.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(spinner);
    }

    /// Count one more module
    pub fn update(&self, module: &Module) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
            bar.set_message(module.name.clone());
        }
    }

    /// Number of modules counted since `start`
    pub fn position(&self) -> u64 {
        self.bar.as_ref().map_or(0, |bar| bar.position())
    }

    /// Finish the operation and clear the spinner
    pub fn finish(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Create a scan callback that updates a ProgressReporter
pub fn create_progress_callback(reporter: &ProgressReporter) -> impl FnMut(&Module) + '_ {
    move |module: &Module| reporter.update(module)
}
