//! Background thread that runs a [`PresenceTracker`] over a classification
//! stream so neither the producer nor the consumer blocks on the other.

use super::{AdapterConfig, DetectionMessage, PresenceTracker};
use crate::classify::ClassificationEvent;
use crate::detection::DetectionState;
use crate::log_debug;
use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often an idle worker rechecks its stop flag.
const STOP_POLL_MS: u64 = 50;

/// Handle the consumer uses to read detector output.
pub struct DetectionJob {
    pub receiver: Receiver<DetectionMessage>,
    pub handle: Option<thread::JoinHandle<DetectionState>>,
    /// Stop advancing; no terminal message is sent for a stop.
    pub stop_flag: Arc<AtomicBool>,
}

impl DetectionJob {
    pub fn request_stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Wait for the worker and return the last state it reached. The state
    /// stays valid after a stop.
    pub fn join(&mut self) -> Result<DetectionState> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("detection worker already joined"))?;
        handle
            .join()
            .map_err(|_| anyhow!("detection worker thread panicked"))
    }
}

/// Spawn a worker that feeds `events` into a fresh detector.
pub fn spawn_detection_worker(
    config: AdapterConfig,
    events: Receiver<ClassificationEvent>,
) -> DetectionJob {
    let (tx, rx) = unbounded();
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    let tracker = PresenceTracker::new(config);

    let handle = thread::spawn(move || {
        let mut tracker = tracker;
        let label = tracker.target().label_name.clone();
        loop {
            if stop_flag_clone.load(Ordering::Relaxed) {
                log_debug(&format!("detector[{label}]: stop requested"));
                break;
            }
            let message = match events.recv_timeout(Duration::from_millis(STOP_POLL_MS)) {
                Ok(event) => tracker.handle(event),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => tracker.finish(),
            };
            let Some(message) = message else {
                continue;
            };
            let terminal = message.is_terminal();
            if tx.send(message).is_err() {
                log_debug(&format!("detector[{label}]: consumer disconnected"));
                break;
            }
            if terminal {
                break;
            }
        }
        let stats = tracker.stats();
        log_debug(&format!(
            "detector[{label}]: accepted={} ignored={} missing={} onsets={} ends={}",
            stats.accepted, stats.below_minimum, stats.missing_label, stats.onsets, stats.ends
        ));
        tracker.state()
    });

    DetectionJob {
        receiver: rx,
        handle: Some(handle),
        stop_flag,
    }
}
