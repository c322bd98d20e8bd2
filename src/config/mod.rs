//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use crate::adapter::AdapterConfig;
use crate::classify::{AnalysisWindow, SoundIdentifier};
use crate::detection::DetectionConfig;
use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_INPUT, MAX_CHANNEL_CAPACITY, MAX_RUN_LENGTH,
    MIN_CHANNEL_CAPACITY,
};
use defaults::{
    DEFAULT_ABSENCE_RUN_LENGTH, DEFAULT_ABSENCE_THRESHOLD, DEFAULT_LABEL, DEFAULT_MIN_CONFIDENCE,
    DEFAULT_OVERLAP_FACTOR, DEFAULT_PRESENCE_RUN_LENGTH, DEFAULT_PRESENCE_THRESHOLD,
    DEFAULT_WINDOW_SECS,
};

/// CLI options for soundwatch. `validate` must pass before the values are used.
#[derive(Debug, Parser, Clone)]
#[command(
    about = "Soundwatch: debounced sound presence detection over classifier output",
    author,
    version
)]
pub struct AppConfig {
    /// Recorded classifier output (newline-delimited JSON), or `-` for stdin
    #[arg(long, short = 'i', default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Classifier label to track
    #[arg(long, default_value = DEFAULT_LABEL)]
    pub label: String,

    /// Confidence must exceed this to count toward presence
    #[arg(long = "presence-threshold", default_value_t = DEFAULT_PRESENCE_THRESHOLD)]
    pub presence_threshold: f64,

    /// Confidence must fall below this to count toward absence
    #[arg(long = "absence-threshold", default_value_t = DEFAULT_ABSENCE_THRESHOLD)]
    pub absence_threshold: f64,

    /// Consecutive presence windows required before reporting an onset
    #[arg(long = "presence-run-length", default_value_t = DEFAULT_PRESENCE_RUN_LENGTH)]
    pub presence_run_length: u32,

    /// Consecutive absence windows required before reporting an end
    #[arg(long = "absence-run-length", default_value_t = DEFAULT_ABSENCE_RUN_LENGTH)]
    pub absence_run_length: u32,

    /// Windows scoring at or below this for the label are ignored
    #[arg(long = "min-confidence", default_value_t = DEFAULT_MIN_CONFIDENCE)]
    pub min_confidence: f64,

    /// Classifier window length (seconds), used to timestamp windows
    #[arg(long = "window-secs", default_value_t = DEFAULT_WINDOW_SECS)]
    pub window_secs: f64,

    /// Overlap between consecutive classifier windows (0.0 - <1.0)
    #[arg(long, default_value_t = DEFAULT_OVERLAP_FACTOR)]
    pub overlap: f64,

    /// Pending classification results buffered between the source and detector
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Reject an absence threshold that is not below the presence threshold
    #[arg(long = "strict-hysteresis", default_value_t = false)]
    pub strict_hysteresis: bool,

    /// Only print onsets and ends, not every accepted window
    #[arg(long = "transitions-only", default_value_t = false)]
    pub transitions_only: bool,

    /// Emit newline-delimited JSON events instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SOUNDWATCH_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SOUNDWATCH_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging raw input lines (debug log only)
    #[arg(
        long = "log-content",
        env = "SOUNDWATCH_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

impl AppConfig {
    pub fn detection_config(&self) -> DetectionConfig {
        DetectionConfig::new(
            self.presence_threshold,
            self.absence_threshold,
            self.presence_run_length,
            self.absence_run_length,
        )
    }

    pub fn sound_identifier(&self) -> SoundIdentifier {
        SoundIdentifier::new(self.label.clone())
    }

    pub fn analysis_window(&self) -> AnalysisWindow {
        AnalysisWindow {
            duration_secs: self.window_secs,
            overlap_factor: self.overlap,
        }
    }

    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            target: self.sound_identifier(),
            min_acceptance: self.min_confidence,
            detection: self.detection_config(),
            transitions_only: self.transitions_only,
        }
    }
}
