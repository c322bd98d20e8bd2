pub mod adapter;
mod app;
pub mod classify;
pub mod config;
pub mod detection;
mod telemetry;

pub use adapter::{
    spawn_detection_worker, AdapterConfig, DetectionJob, DetectionMessage, DetectionUpdate,
    PresenceTracker, SharedDetector,
};
pub use app::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
pub use classify::{
    spawn_source, AnalysisWindow, ClassificationError, ClassificationEvent, ClassificationResult,
    ClassificationSource, ReplaySource, SoundIdentifier,
};
pub use detection::{advance, DetectionConfig, DetectionState, Phase, Transition};
