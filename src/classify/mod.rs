//! Boundary types for the external sound classifier.
//!
//! The classifier itself lives outside this crate. What crosses the boundary
//! is a stream of [`ClassificationEvent`]s: per-window label confidences,
//! followed by at most one terminal event.

mod replay;
mod source;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

pub use replay::{ReplayRecord, ReplaySource};
pub use source::{spawn_source, ClassificationSource, SourceHandle};

/// Analysis window length the classifier was tuned for (seconds).
pub const DEFAULT_WINDOW_SECS: f64 = 1.5;

/// Fraction of each window shared with the next one.
pub const DEFAULT_OVERLAP_FACTOR: f64 = 0.9;

/// Failures reported by the classification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// The audio stream was cut off mid-session (hardware or host interruption).
    #[error("audio stream interrupted")]
    StreamInterrupted,
    /// The capture resource could not be acquired.
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("classifier failed: {0}")]
    Classifier(String),
}

impl ClassificationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassificationError::StreamInterrupted => "stream_interrupted",
            ClassificationError::AccessDenied(_) => "access_denied",
            ClassificationError::Classifier(_) => "classifier",
        }
    }
}

/// Label confidences for one analysis window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationResult {
    confidences: BTreeMap<String, f64>,
    window_start: Duration,
}

impl ClassificationResult {
    pub fn new(window_start: Duration) -> Self {
        Self {
            confidences: BTreeMap::new(),
            window_start,
        }
    }

    pub fn with_confidence(mut self, label: impl Into<String>, confidence: f64) -> Self {
        self.insert(label, confidence);
        self
    }

    pub fn insert(&mut self, label: impl Into<String>, confidence: f64) {
        self.confidences.insert(label.into(), confidence);
    }

    pub fn confidence(&self, label: &str) -> Option<f64> {
        self.confidences.get(label).copied()
    }

    pub fn window_start(&self) -> Duration {
        self.window_start
    }
}

/// One item of the classification stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationEvent {
    Result(ClassificationResult),
    /// The producer finished normally.
    Completed,
    Failed(ClassificationError),
}

impl ClassificationEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClassificationEvent::Result(_))
    }
}

/// Window geometry of the classifier: how long each window is and how much
/// consecutive windows overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisWindow {
    pub duration_secs: f64,
    pub overlap_factor: f64,
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_WINDOW_SECS,
            overlap_factor: DEFAULT_OVERLAP_FACTOR,
        }
    }
}

impl AnalysisWindow {
    /// Distance between the starts of consecutive windows (seconds).
    pub fn hop_secs(&self) -> f64 {
        (self.duration_secs * (1.0 - self.overlap_factor)).max(0.0)
    }

    /// Start of the `index`-th window relative to the start of the stream.
    pub fn window_start(&self, index: u64) -> Duration {
        let secs = self.hop_secs() * index as f64;
        match Duration::try_from_secs_f64(secs) {
            Ok(start) => start,
            Err(_) if secs > 0.0 => Duration::MAX,
            Err(_) => Duration::ZERO,
        }
    }
}

/// A classifier label plus the name shown to people.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundIdentifier {
    pub label_name: String,
    pub display_name: String,
}

impl SoundIdentifier {
    pub fn new(label_name: impl Into<String>) -> Self {
        let label_name = label_name.into();
        let display_name = Self::display_name_for_label(&label_name);
        Self {
            label_name,
            display_name,
        }
    }

    /// `"dog_bark"` -> `"Dog Bark"`.
    pub fn display_name_for_label(label: &str) -> String {
        label
            .replace('_', " ")
            .split(' ')
            .map(capitalize_word)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
