//! Debounced presence detection.
//!
//! Turns a noisy stream of per-window classifier confidences into a stable
//! detected / not-detected signal. Entry and exit each have their own
//! threshold and their own run length, so a single sample near the boundary
//! never flips the output.


use serde::Serialize;

/// Thresholds and run lengths that stay fixed for the lifetime of a detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionConfig {
    /// Confidence must be strictly above this to count toward entry.
    pub presence_threshold: f64,
    /// Confidence must be strictly below this to count toward exit.
    pub absence_threshold: f64,
    /// Consecutive qualifying samples needed to enter the detected state.
    pub presence_run_length: u32,
    /// Consecutive qualifying samples needed to leave the detected state.
    pub absence_run_length: u32,
}

impl DetectionConfig {
    pub fn new(
        presence_threshold: f64,
        absence_threshold: f64,
        presence_run_length: u32,
        absence_run_length: u32,
    ) -> Self {
        Self {
            presence_threshold,
            absence_threshold,
            presence_run_length,
            absence_run_length,
        }
    }

    /// True when the exit threshold sits strictly below the entry threshold.
    pub fn has_hysteresis_margin(&self) -> bool {
        self.absence_threshold < self.presence_threshold
    }

    pub fn initial_state(self) -> DetectionState {
        DetectionState::from_config(self)
    }
}

/// The two stable outputs of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotDetected,
    Detected,
}

/// A committed change of the stable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// not detected -> detected
    Onset,
    /// detected -> not detected
    End,
}

impl Transition {
    pub fn label(self) -> &'static str {
        match self {
            Transition::Onset => "onset",
            Transition::End => "end",
        }
    }
}

/// Snapshot of the detector after some number of samples.
///
/// States are plain values: every new state is derived from the previous one
/// plus a single confidence, so a history can be replayed from any
/// checkpoint given the same ordered samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionState {
    config: DetectionConfig,
    is_detected: bool,
    transition_progress: u32,
    current_confidence: f64,
}

impl DetectionState {
    /// Build the initial (not detected) state.
    ///
    /// A run length of 0 is accepted: the transition check is `progress >=
    /// run_length`, so with 0 every sample commits a transition in that
    /// direction whether or not it qualifies.
    pub fn new(
        presence_threshold: f64,
        absence_threshold: f64,
        presence_run_length: u32,
        absence_run_length: u32,
    ) -> Self {
        Self::from_config(DetectionConfig::new(
            presence_threshold,
            absence_threshold,
            presence_run_length,
            absence_run_length,
        ))
    }

    pub fn from_config(config: DetectionConfig) -> Self {
        Self {
            config,
            is_detected: false,
            transition_progress: 0,
            current_confidence: 0.0,
        }
    }

    pub fn config(&self) -> DetectionConfig {
        self.config
    }

    pub fn presence_threshold(&self) -> f64 {
        self.config.presence_threshold
    }

    pub fn absence_threshold(&self) -> f64 {
        self.config.absence_threshold
    }

    pub fn presence_run_length(&self) -> u32 {
        self.config.presence_run_length
    }

    pub fn absence_run_length(&self) -> u32 {
        self.config.absence_run_length
    }

    pub fn is_detected(&self) -> bool {
        self.is_detected
    }

    pub fn transition_progress(&self) -> u32 {
        self.transition_progress
    }

    /// Most recent sample. Carried for observability only.
    pub fn current_confidence(&self) -> f64 {
        self.current_confidence
    }

    pub fn phase(&self) -> Phase {
        if self.is_detected {
            Phase::Detected
        } else {
            Phase::NotDetected
        }
    }

    /// Whether `confidence` counts toward leaving the current phase.
    ///
    /// Comparisons are strict and non-finite values never qualify.
    pub fn qualifies(&self, confidence: f64) -> bool {
        if !confidence.is_finite() {
            return false;
        }
        if self.is_detected {
            confidence < self.config.absence_threshold
        } else {
            confidence > self.config.presence_threshold
        }
    }

    /// Consume one sample and return the next state together with the
    /// transition it committed, if any.
    pub fn advanced(self, confidence: f64) -> (Self, Option<Transition>) {
        let mut next = self;
        let required = if self.is_detected {
            self.config.absence_run_length
        } else {
            self.config.presence_run_length
        };

        if self.qualifies(confidence) {
            next.transition_progress = self.transition_progress.saturating_add(1);
        } else {
            next.transition_progress = 0;
        }

        let mut transition = None;
        if next.transition_progress >= required {
            next.is_detected = !self.is_detected;
            next.transition_progress = 0;
            transition = Some(if next.is_detected {
                Transition::Onset
            } else {
                Transition::End
            });
        }

        next.current_confidence = confidence;
        (next, transition)
    }

    /// Fold an ordered slice of samples starting from `self`.
    pub fn replay(self, samples: &[f64]) -> Self {
        samples
            .iter()
            .fold(self, |state, &confidence| state.advanced(confidence).0)
    }
}

/// Pure transition function: derive the state that follows `prior` after one
/// more sample.
pub fn advance(prior: &DetectionState, confidence: f64) -> DetectionState {
    prior.advanced(confidence).0
}
