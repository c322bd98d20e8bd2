//! Producer side of the classification stream.

use super::{ClassificationError, ClassificationEvent, ClassificationResult};
use crate::log_debug;
use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// The external capture + classification pipeline.
///
/// `open` acquires whatever the source needs (device, file, model). A failure
/// there is reported before any result is produced. After that the source
/// yields results one at a time; `None` means it completed normally and an
/// `Err` ends the stream.
pub trait ClassificationSource: Send {
    fn open(&mut self) -> Result<(), ClassificationError>;
    fn next_event(&mut self) -> Option<Result<ClassificationResult, ClassificationError>>;
    fn name(&self) -> &'static str {
        "unknown_source"
    }
}

/// Handle for the producer thread.
pub struct SourceHandle {
    pub handle: Option<thread::JoinHandle<u64>>,
    /// Stop producing after the current result.
    pub stop_flag: Arc<AtomicBool>,
}

impl SourceHandle {
    pub fn request_stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Wait for the producer and return how many results it delivered.
    pub fn join(&mut self) -> Result<u64> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("classification source already joined"))?;
        handle
            .join()
            .map_err(|_| anyhow!("classification source thread panicked"))
    }
}

/// Run `source` on a background thread and stream its output.
///
/// Results are sent in order through a bounded channel of `capacity`; a full
/// channel blocks the producer rather than dropping windows. The stream ends
/// with exactly one `Completed` or `Failed` event unless the handle is
/// stopped, in which case the channel simply disconnects.
pub fn spawn_source<S>(source: S, capacity: usize) -> (Receiver<ClassificationEvent>, SourceHandle)
where
    S: ClassificationSource + 'static,
{
    let (tx, rx) = bounded(capacity.max(1));
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();

    let handle = thread::spawn(move || run_source(source, tx, stop_flag_clone));

    (
        rx,
        SourceHandle {
            handle: Some(handle),
            stop_flag,
        },
    )
}

fn run_source<S: ClassificationSource>(
    mut source: S,
    tx: Sender<ClassificationEvent>,
    stop_flag: Arc<AtomicBool>,
) -> u64 {
    let name = source.name();
    if let Err(err) = source.open() {
        log_debug(&format!("{name}: open failed: {err}"));
        let _ = tx.send(ClassificationEvent::Failed(err));
        return 0;
    }

    let mut delivered = 0u64;
    loop {
        if stop_flag.load(Ordering::Relaxed) {
            log_debug(&format!("{name}: stopped after {delivered} results"));
            return delivered;
        }
        let event = match source.next_event() {
            Some(Ok(result)) => ClassificationEvent::Result(result),
            Some(Err(err)) => ClassificationEvent::Failed(err),
            None => ClassificationEvent::Completed,
        };
        let terminal = event.is_terminal();
        if tx.send(event).is_err() {
            log_debug(&format!("{name}: consumer disconnected"));
            return delivered;
        }
        if terminal {
            return delivered;
        }
        delivered += 1;
    }
}
