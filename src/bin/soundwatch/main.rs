//! soundwatch entrypoint: replays classifier output through the presence
//! detector and reports when the target sound starts and stops.
//!
//! # Architecture
//!
//! - Source thread: reads classifier windows and pushes them into a bounded channel
//! - Detector thread: filters windows for the target label and advances the detector
//! - Main thread: sole owner of detector output; prints events and the session summary

mod output;
mod session_stats;

use anyhow::{bail, Result};
use soundwatch::config::AppConfig;
use soundwatch::{
    init_logging, log_debug, log_file_path, log_panic, spawn_detection_worker, spawn_source,
    DetectionMessage, ReplaySource,
};
use std::io::{self, Write};
use std::panic;

use crate::output::{write_event, SessionEvent};
use crate::session_stats::{format_session_stats, SessionStats};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    install_panic_hook();
    log_debug("=== soundwatch started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    for warning in config.warnings() {
        log_debug(&format!("config warning: {warning}"));
        eprintln!("warning: {warning}");
    }
    if config.presence_latches() {
        log_debug("min confidence is at or above the absence threshold; onsets will latch");
    }

    let target = config.sound_identifier();
    let source = ReplaySource::from_path(&config.input, config.analysis_window());
    let (events, mut source_handle) = spawn_source(source, config.channel_capacity);
    let mut job = spawn_detection_worker(config.adapter_config(), events);

    let mut stats = SessionStats::new(target.clone());
    let mut failure = None;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for message in job.receiver.iter() {
        stats.record(&message);
        let event = SessionEvent::from_message(&message);
        write_event(&mut out, &event, &target, config.json)?;
        if let DetectionMessage::Failed(err) = message {
            failure = Some(err);
        }
    }

    let final_state = job.join()?;
    source_handle.request_stop();
    let delivered = source_handle.join()?;
    log_debug(&format!(
        "session done: {delivered} windows read, detected={} progress={}",
        final_state.is_detected(),
        final_state.transition_progress()
    ));

    if config.json {
        write_event(&mut out, &SessionEvent::summary(&stats), &target, true)?;
    } else {
        writeln!(out, "{}", format_session_stats(&stats))?;
    }
    out.flush()?;

    if let Some(err) = failure {
        bail!("classification stream failed: {err}");
    }
    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log_panic(info);
        default_hook(info);
    }));
}
