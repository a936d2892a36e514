//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait that the table reader
//! and the duplicate analyzer notify, and the [`Progress`] struct which
//! implements it with terminal progress bars.
//!
//! # Accessible Mode
//!
//! When accessible mode is enabled, progress reporting uses simplified output:
//! - No spinners or animations
//! - Plain ASCII bars
//! - Reduced update frequency for screen reader compatibility

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::duplicates::AnalysisStats;

/// Progress callback for the reading and grouping phases.
///
/// Implement this trait to observe a run. Callbacks are purely
/// observational and have no effect on analysis results.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "reading", "grouping")
    /// * `total` - Total number of items to process (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called as items are processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items processed so far
    /// * `message` - Short description of the current item
    fn on_progress(&self, current: usize, message: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}

    /// Called once when the analysis finishes, with its summary counts.
    fn on_summary(&self, _stats: &AnalysisStats) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    reading: Mutex<Option<ProgressBar>>,
    grouping: Mutex<Option<ProgressBar>>,
    quiet: bool,
    accessible: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowdupe::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self::with_accessible(quiet, false)
    }

    /// Create a new progress reporter with accessible mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowdupe::progress::Progress;
    ///
    /// let progress = Progress::with_accessible(false, true);
    /// assert!(progress.is_accessible());
    /// ```
    #[must_use]
    pub fn with_accessible(quiet: bool, accessible: bool) -> Self {
        let multi = MultiProgress::new();
        if quiet {
            multi.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self {
            multi,
            reading: Mutex::new(None),
            grouping: Mutex::new(None),
            quiet,
            accessible,
        }
    }

    /// Check if accessible mode is enabled.
    #[must_use]
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Create a style for the reading phase (spinner, row count unknown up front).
    fn reading_style(&self) -> ProgressStyle {
        if self.accessible {
            ProgressStyle::with_template("{msg} [{elapsed_precise}] {pos} rows")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
        } else {
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} rows")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        }
    }

    /// Create a style for the grouping phase (progress bar).
    fn grouping_style(&self) -> ProgressStyle {
        if self.accessible {
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        } else {
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} {per_sec} (ETA: {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-")
        }
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            "reading" => Some(&self.reading),
            "grouping" => Some(&self.grouping),
            _ => None,
        }
    }

    fn active_bar(&self) -> Option<ProgressBar> {
        lock(&self.grouping)
            .clone()
            .or_else(|| lock(&self.reading).clone())
    }
}

/// Lock a bar slot, recovering the guard if another thread panicked while holding it.
fn lock(slot: &Mutex<Option<ProgressBar>>) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "reading" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(self.reading_style());
                pb.set_message("Reading CSV file");
                let tick_rate = if self.accessible { 500 } else { 100 };
                pb.enable_steady_tick(Duration::from_millis(tick_rate));
                *lock(&self.reading) = Some(pb);
            }
            "grouping" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(self.grouping_style());
                pb.set_message("Processing rows");
                *lock(&self.grouping) = Some(pb);
            }
            other => {
                log::debug!("No progress bar for phase '{}'", other);
            }
        }
    }

    fn on_progress(&self, current: usize, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.active_bar() {
            pb.set_position(current as u64);
            if !message.is_empty() {
                pb.set_message(truncate_message(message, 30));
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        if let Some(slot) = self.slot(phase) {
            if let Some(pb) = lock(slot).take() {
                let done = match phase {
                    "reading" => "Reading complete",
                    _ => "Processing complete",
                };
                pb.finish_with_message(done);
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.active_bar() {
            pb.set_message(message.to_string());
        }
    }

    fn on_summary(&self, stats: &AnalysisStats) {
        log::debug!(
            "Progress summary: {} exported duplicate rows, {} single rows, {} duplicate patterns",
            stats.exported_duplicate_rows,
            stats.single_rows,
            stats.duplicate_patterns
        );
    }
}

/// Truncate a message for display in the progress bar, keeping its tail.
fn truncate_message(message: &str, max_len: usize) -> String {
    let count = message.chars().count();
    if count <= max_len {
        return message.to_string();
    }
    let tail: String = message.chars().skip(count - (max_len - 3)).collect();
    format!("...{}", tail)
}
