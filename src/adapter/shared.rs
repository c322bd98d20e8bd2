use crate::detection::{DetectionConfig, DetectionState, Transition};
use crate::log_debug;
use std::sync::{Arc, Mutex, MutexGuard};

/// A detector that several producers can advance.
///
/// `advance` is a read-modify-write of the progress counter, so every call
/// takes the lock for the whole step.
#[derive(Debug, Clone)]
pub struct SharedDetector {
    state: Arc<Mutex<DetectionState>>,
}

impl SharedDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(config.initial_state())),
        }
    }

    pub fn advance(&self, confidence: f64) -> (DetectionState, Option<Transition>) {
        let mut guard = self.lock();
        let (next, transition) = guard.advanced(confidence);
        *guard = next;
        (next, transition)
    }

    pub fn snapshot(&self) -> DetectionState {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, DetectionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log_debug("shared detector mutex poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }
}
