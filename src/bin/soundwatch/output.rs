//! Rendering of detector output for the terminal.
//!
//! Text mode prints one human-readable line per event. JSON mode prints
//! newline-delimited objects tagged by an `"event"` field.

use serde::Serialize;
use soundwatch::{DetectionMessage, SoundIdentifier, Transition};
use std::io::{self, Write};

use crate::session_stats::{recording_notice, SessionStats};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// not detected -> detected
    #[serde(rename = "onset")]
    Onset {
        label: String,
        time_secs: f64,
        confidence: f64,
    },

    /// detected -> not detected
    #[serde(rename = "end")]
    End {
        label: String,
        time_secs: f64,
        confidence: f64,
    },

    /// Accepted window that did not change the output
    #[serde(rename = "sample")]
    Sample {
        label: String,
        time_secs: f64,
        confidence: f64,
        detected: bool,
        progress: u32,
        required: u32,
    },

    #[serde(rename = "finished")]
    Finished,

    #[serde(rename = "failed")]
    Failed { kind: String, message: String },

    #[serde(rename = "summary")]
    Summary {
        label: String,
        detected: bool,
        windows: u64,
        onsets: u32,
        ends: u32,
        detected_secs: f64,
        notice: String,
    },
}

impl SessionEvent {
    pub fn from_message(message: &DetectionMessage) -> Self {
        match message {
            DetectionMessage::Update(update) => {
                let label = update.label.clone();
                let time_secs = update.window_start.as_secs_f64();
                let confidence = update.state.current_confidence();
                match update.transition {
                    Some(Transition::Onset) => SessionEvent::Onset {
                        label,
                        time_secs,
                        confidence,
                    },
                    Some(Transition::End) => SessionEvent::End {
                        label,
                        time_secs,
                        confidence,
                    },
                    None => {
                        let state = update.state;
                        let required = if state.is_detected() {
                            state.absence_run_length()
                        } else {
                            state.presence_run_length()
                        };
                        SessionEvent::Sample {
                            label,
                            time_secs,
                            confidence,
                            detected: state.is_detected(),
                            progress: state.transition_progress(),
                            required,
                        }
                    }
                }
            }
            DetectionMessage::Finished => SessionEvent::Finished,
            DetectionMessage::Failed(err) => SessionEvent::Failed {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }

    pub fn summary(stats: &SessionStats) -> Self {
        SessionEvent::Summary {
            label: stats.target.label_name.clone(),
            detected: stats.was_detected(),
            windows: stats.samples,
            onsets: stats.onsets,
            ends: stats.ends,
            detected_secs: stats.detected_time.as_secs_f64(),
            notice: recording_notice(stats),
        }
    }

    /// Human-readable line for text mode.
    pub fn render_text(&self, target: &SoundIdentifier) -> String {
        let name = &target.display_name;
        match self {
            SessionEvent::Onset {
                time_secs,
                confidence,
                ..
            } => format!("[{time_secs:>8.2}s] {name} detected (confidence {confidence:.2})"),
            SessionEvent::End {
                time_secs,
                confidence,
                ..
            } => format!(
                "[{time_secs:>8.2}s] {name} no longer detected (confidence {confidence:.2})"
            ),
            SessionEvent::Sample {
                time_secs,
                confidence,
                detected,
                progress,
                required,
                ..
            } => {
                let phase = if *detected { "detected" } else { "not detected" };
                format!(
                    "[{time_secs:>8.2}s] {} {confidence:.2} ({phase}, {progress}/{required})",
                    target.label_name
                )
            }
            SessionEvent::Finished => "classification stream finished".to_string(),
            SessionEvent::Failed { message, .. } => {
                format!("classification stream failed: {message}")
            }
            SessionEvent::Summary { notice, .. } => notice.clone(),
        }
    }
}

/// Write one event as a line of text or JSON.
pub fn write_event<W: Write>(
    out: &mut W,
    event: &SessionEvent,
    target: &SoundIdentifier,
    json: bool,
) -> io::Result<()> {
    if json {
        let line = serde_json::to_string(event).map_err(io::Error::other)?;
        writeln!(out, "{line}")
    } else {
        writeln!(out, "{}", event.render_text(target))
    }
}
