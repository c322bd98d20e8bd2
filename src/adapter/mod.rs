//! Bridges a classification stream into a presence detector.
//!
//! The adapter picks one label out of every classification result, drops
//! windows that are not confident enough to count, advances the detector
//! with the rest, and republishes the resulting state to a single consumer.
//! Terminal events from upstream are forwarded exactly once.

mod shared;
mod worker;

use crate::classify::{
    ClassificationError, ClassificationEvent, ClassificationResult, SoundIdentifier,
};
use crate::detection::{DetectionConfig, DetectionState, Transition};
use std::time::Duration;

pub use shared::SharedDetector;
pub use worker::{spawn_detection_worker, DetectionJob};

/// Label the adapter tracks when none is configured.
pub const DEFAULT_TARGET_LABEL: &str = "music";

/// Results must score strictly above this for the target label to be used.
pub const DEFAULT_MIN_ACCEPTANCE: f64 = 0.5;

pub const DEFAULT_PRESENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_ABSENCE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_PRESENCE_RUN_LENGTH: u32 = 2;
pub const DEFAULT_ABSENCE_RUN_LENGTH: u32 = 30;

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub target: SoundIdentifier,
    pub min_acceptance: f64,
    pub detection: DetectionConfig,
    /// Publish only updates that commit a transition.
    pub transitions_only: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            target: SoundIdentifier::new(DEFAULT_TARGET_LABEL),
            min_acceptance: DEFAULT_MIN_ACCEPTANCE,
            detection: DetectionConfig::new(
                DEFAULT_PRESENCE_THRESHOLD,
                DEFAULT_ABSENCE_THRESHOLD,
                DEFAULT_PRESENCE_RUN_LENGTH,
                DEFAULT_ABSENCE_RUN_LENGTH,
            ),
            transitions_only: false,
        }
    }
}

/// Detector output for one accepted window.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionUpdate {
    pub label: String,
    pub state: DetectionState,
    pub transition: Option<Transition>,
    pub window_start: Duration,
}

/// Messages sent from the adapter to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionMessage {
    Update(DetectionUpdate),
    /// Upstream completed normally.
    Finished,
    Failed(ClassificationError),
}

impl DetectionMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DetectionMessage::Update(_))
    }
}

/// Why a classification result did or did not reach the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acceptance {
    Accepted(f64),
    MissingLabel,
    BelowMinimum(f64),
}

/// Counters kept by a [`PresenceTracker`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub accepted: u64,
    pub missing_label: u64,
    pub below_minimum: u64,
    pub onsets: u64,
    pub ends: u64,
}

/// Synchronous core of the adapter: one target label, one live state.
///
/// Not meant to be shared across threads; wrap the detector in a
/// [`SharedDetector`] when several producers have to feed it.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    config: AdapterConfig,
    state: DetectionState,
    terminated: bool,
    stats: TrackerStats,
}

impl PresenceTracker {
    pub fn new(config: AdapterConfig) -> Self {
        let state = config.detection.initial_state();
        Self {
            config,
            state,
            terminated: false,
            stats: TrackerStats::default(),
        }
    }

    pub fn state(&self) -> DetectionState {
        self.state
    }

    pub fn target(&self) -> &SoundIdentifier {
        &self.config.target
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// True once a terminal event has been forwarded.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Decide whether `result` feeds the detector.
    ///
    /// Low-confidence windows are ignored rather than treated as absence
    /// evidence, so they never touch the transition progress.
    pub fn acceptance(&self, result: &ClassificationResult) -> Acceptance {
        match result.confidence(&self.config.target.label_name) {
            None => Acceptance::MissingLabel,
            Some(confidence)
                if confidence.is_finite() && confidence > self.config.min_acceptance =>
            {
                Acceptance::Accepted(confidence)
            }
            Some(confidence) => Acceptance::BelowMinimum(confidence),
        }
    }

    /// Process one upstream event. Returns the message to publish, if any.
    ///
    /// After the first terminal event every further event is ignored.
    pub fn handle(&mut self, event: ClassificationEvent) -> Option<DetectionMessage> {
        if self.terminated {
            return None;
        }
        match event {
            ClassificationEvent::Result(result) => self.accept(&result),
            ClassificationEvent::Completed => {
                self.terminated = true;
                tracing::info!(
                    label = %self.config.target.label_name,
                    "classification stream completed"
                );
                Some(DetectionMessage::Finished)
            }
            ClassificationEvent::Failed(err) => {
                self.terminated = true;
                tracing::warn!(
                    label = %self.config.target.label_name,
                    kind = err.kind(),
                    "classification stream failed: {err}"
                );
                Some(DetectionMessage::Failed(err))
            }
        }
    }

    /// Treat a vanished upstream as completion, unless a terminal event was
    /// already forwarded.
    pub fn finish(&mut self) -> Option<DetectionMessage> {
        self.handle(ClassificationEvent::Completed)
    }

    fn accept(&mut self, result: &ClassificationResult) -> Option<DetectionMessage> {
        let confidence = match self.acceptance(result) {
            Acceptance::Accepted(confidence) => confidence,
            Acceptance::MissingLabel => {
                self.stats.missing_label += 1;
                return None;
            }
            Acceptance::BelowMinimum(_) => {
                self.stats.below_minimum += 1;
                return None;
            }
        };

        self.stats.accepted += 1;
        let (next, transition) = self.state.advanced(confidence);
        self.state = next;

        let window_secs = result.window_start().as_secs_f64();
        if let Some(kind) = transition {
            match kind {
                Transition::Onset => self.stats.onsets += 1,
                Transition::End => self.stats.ends += 1,
            }
            tracing::info!(
                label = %self.config.target.label_name,
                transition = kind.label(),
                confidence,
                window_secs,
                "presence transition"
            );
        }

        if self.config.transitions_only && transition.is_none() {
            return None;
        }
        Some(DetectionMessage::Update(DetectionUpdate {
            label: self.config.target.label_name.clone(),
            state: next,
            transition,
            window_start: result.window_start(),
        }))
    }
}
