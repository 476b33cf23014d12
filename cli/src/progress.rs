use crate::ui;
use std::time::{Duration, Instant};

/// A simple progress tracker for CLI operations. A quiet tracker prints
/// nothing, so JSON output stays machine-readable.
pub struct ProgressTracker {
    operation_name: String,
    start_time: Instant,
    steps: Vec<String>,
    current_step: usize,
    quiet: bool,
}

impl ProgressTracker {
    /// Create a new progress tracker with the given operation name
    pub fn new(operation_name: &str, quiet: bool) -> Self {
        if !quiet {
            ui::section_header(operation_name);
        }
        Self {
            operation_name: operation_name.to_string(),
            start_time: Instant::now(),
            steps: Vec::new(),
            current_step: 0,
            quiet,
        }
    }

    /// Add steps to the tracker
    pub fn with_steps(mut self, steps: &[&str]) -> Self {
        self.steps = steps.iter().map(|step| (*step).to_string()).collect();
        self
    }

    /// Start the next step
    pub fn start_step(&self) {
        if let Some(step) = self.steps.get(self.current_step) {
            tracing::debug!(step = %step, "starting step");
            if !self.quiet {
                ui::status_message(step);
            }
        }
    }

    /// Complete the current step
    pub fn complete_step(&mut self) {
        if let Some(step) = self.steps.get(self.current_step) {
            if !self.quiet {
                ui::success_message(step);
            }
            self.current_step += 1;
        }
    }

    /// Skip the current step
    pub fn skip_step(&mut self, reason: &str) {
        if let Some(step) = self.steps.get(self.current_step) {
            if !self.quiet {
                ui::warning_message(&format!("Skipped: {step} ({reason})"));
            }
            self.current_step += 1;
        }
    }

    /// Skip every remaining step
    pub fn skip_remaining(&mut self, reason: &str) {
        while self.current_step < self.steps.len() {
            self.skip_step(reason);
        }
    }

    /// Complete the operation
    pub fn complete(&self) {
        if self.quiet {
            return;
        }
        let elapsed = self.start_time.elapsed();
        ui::success_message(&format!(
            "{} completed in {}",
            self.operation_name,
            Self::format_duration(elapsed)
        ));
    }

    /// Format a duration in a human-readable way
    fn format_duration(duration: Duration) -> String {
        let seconds = duration.as_secs();
        if seconds < 60 {
            format!("{seconds} seconds")
        } else if seconds < 3600 {
            format!(
                "{} minutes {seconds_remainder} seconds",
                seconds / 60,
                seconds_remainder = seconds % 60
            )
        } else {
            format!(
                "{hours} hours {minutes} minutes",
                hours = seconds / 3600,
                minutes = (seconds % 3600) / 60
            )
        }
    }
}
