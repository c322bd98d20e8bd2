//! Session statistics tracking.
//!
//! Owned by the consumer loop; this is the only place that remembers whether
//! the target sound was ever detected.

use soundwatch::{DetectionMessage, SoundIdentifier, Transition};
use std::time::{Duration, Instant};

/// Statistics for one detection session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub target: SoundIdentifier,
    /// Windows that reached the detector
    pub samples: u64,
    pub onsets: u32,
    pub ends: u32,
    /// Stream time spent in the detected state
    pub detected_time: Duration,
    pub failed: bool,
    open_onset: Option<Duration>,
    last_window: Duration,
    start_time: Instant,
}

impl SessionStats {
    pub fn new(target: SoundIdentifier) -> Self {
        Self {
            target,
            samples: 0,
            onsets: 0,
            ends: 0,
            detected_time: Duration::ZERO,
            failed: false,
            open_onset: None,
            last_window: Duration::ZERO,
            start_time: Instant::now(),
        }
    }

    pub fn record(&mut self, message: &DetectionMessage) {
        match message {
            DetectionMessage::Update(update) => {
                self.samples += 1;
                self.last_window = self.last_window.max(update.window_start);
                match update.transition {
                    Some(Transition::Onset) => {
                        self.onsets += 1;
                        self.open_onset = Some(update.window_start);
                    }
                    Some(Transition::End) => {
                        self.ends += 1;
                        if let Some(onset) = self.open_onset.take() {
                            self.detected_time += update.window_start.saturating_sub(onset);
                        }
                    }
                    None => {}
                }
            }
            DetectionMessage::Finished => self.close_open_onset(),
            DetectionMessage::Failed(_) => {
                self.failed = true;
                self.close_open_onset();
            }
        }
    }

    fn close_open_onset(&mut self) {
        if let Some(onset) = self.open_onset.take() {
            self.detected_time += self.last_window.saturating_sub(onset);
        }
    }

    /// Whether the target was detected at any point. Drives the recording warning.
    pub fn was_detected(&self) -> bool {
        self.onsets > 0
    }

    pub fn wall_time(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Format session stats for display on exit.
pub fn format_session_stats(stats: &SessionStats) -> String {
    let mut lines = vec![
        String::new(),
        "Session Summary".to_string(),
        "───────────────".to_string(),
        format_stat_line("Label", &stats.target.display_name),
        format_stat_line("Windows", &stats.samples.to_string()),
        format_stat_line("Onsets", &stats.onsets.to_string()),
    ];
    if stats.ends > 0 {
        lines.push(format_stat_line("Ends", &stats.ends.to_string()));
    }
    if stats.was_detected() {
        lines.push(format_stat_line(
            "Detected",
            &format_duration(stats.detected_time.as_secs_f32()),
        ));
    }
    lines.push(format_stat_line(
        "Wall time",
        &format_duration(stats.wall_time().as_secs_f32()),
    ));
    lines.push(String::new());
    lines.push(recording_notice(stats));
    lines.join("\n")
}

/// The message shown once a recording ends.
pub fn recording_notice(stats: &SessionStats) -> String {
    let name = &stats.target.display_name;
    if stats.was_detected() {
        format!(
            "{name} was detected during this session. If your recording contains {}, check its copyright before sharing it.",
            stats.target.label_name.replace('_', " ")
        )
    } else if stats.failed {
        format!("Session ended early; no {name} detected before the failure.")
    } else {
        format!("No {name} detected.")
    }
}

fn format_stat_line(label: &str, value: &str) -> String {
    format!("{:<12} {}", label, value)
}

fn format_duration(secs: f32) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins as u32, remaining_secs)
    } else {
        let hours = (secs / 3600.0).floor();
        let remaining_mins = ((secs % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours as u32, remaining_mins as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundwatch::{ClassificationError, DetectionState, DetectionUpdate};

    fn update(secs: f64, transition: Option<Transition>) -> DetectionMessage {
        DetectionMessage::Update(DetectionUpdate {
            label: "music".to_string(),
            state: DetectionState::new(0.5, 0.3, 2, 2),
            transition,
            window_start: Duration::from_secs_f64(secs),
        })
    }

    #[test]
    fn counts_onsets_and_detected_time() {
        let mut stats = SessionStats::new(SoundIdentifier::new("music"));
        stats.record(&update(0.0, None));
        stats.record(&update(1.0, Some(Transition::Onset)));
        stats.record(&update(4.0, Some(Transition::End)));
        stats.record(&update(5.0, Some(Transition::Onset)));
        stats.record(&update(6.5, None));
        stats.record(&DetectionMessage::Finished);

        assert_eq!(stats.samples, 5);
        assert_eq!(stats.onsets, 2);
        assert_eq!(stats.ends, 1);
        assert_eq!(stats.detected_time, Duration::from_secs_f64(4.5));
        assert!(stats.was_detected());
    }

    #[test]
    fn notice_mentions_copyright_when_detected() {
        let mut stats = SessionStats::new(SoundIdentifier::new("music"));
        stats.record(&update(0.3, Some(Transition::Onset)));
        assert!(recording_notice(&stats).contains("Music was detected"));
        assert!(recording_notice(&stats).contains("copyright"));
    }

    #[test]
    fn notice_reports_failure_without_detection() {
        let mut stats = SessionStats::new(SoundIdentifier::new("music"));
        stats.record(&DetectionMessage::Failed(
            ClassificationError::StreamInterrupted,
        ));
        assert!(stats.failed);
        assert!(recording_notice(&stats).starts_with("Session ended early"));

        let quiet = SessionStats::new(SoundIdentifier::new("dog_bark"));
        assert_eq!(recording_notice(&quiet), "No Dog Bark detected.");
    }

    #[test]
    fn summary_lists_detected_time_only_when_detected() {
        let quiet = SessionStats::new(SoundIdentifier::new("music"));
        assert!(!format_session_stats(&quiet).contains("Detected"));

        let mut stats = SessionStats::new(SoundIdentifier::new("music"));
        stats.record(&update(0.0, Some(Transition::Onset)));
        stats.record(&update(2.0, Some(Transition::End)));
        let summary = format_session_stats(&stats);
        assert!(summary.contains("Detected     2.0s"));
        assert!(summary.contains("Ends"));
    }

    #[test]
    fn format_duration_scales() {
        assert_eq!(format_duration(30.5), "30.5s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3720.0), "1h 2m");
    }
}
