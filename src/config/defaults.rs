use crate::adapter;
use crate::classify;

pub const DEFAULT_INPUT: &str = "-";
pub(super) const DEFAULT_LABEL: &str = adapter::DEFAULT_TARGET_LABEL;

pub(super) const DEFAULT_PRESENCE_THRESHOLD: f64 = adapter::DEFAULT_PRESENCE_THRESHOLD;
pub(super) const DEFAULT_ABSENCE_THRESHOLD: f64 = adapter::DEFAULT_ABSENCE_THRESHOLD;
pub(super) const DEFAULT_PRESENCE_RUN_LENGTH: u32 = adapter::DEFAULT_PRESENCE_RUN_LENGTH;
pub(super) const DEFAULT_ABSENCE_RUN_LENGTH: u32 = adapter::DEFAULT_ABSENCE_RUN_LENGTH;
pub(super) const DEFAULT_MIN_CONFIDENCE: f64 = adapter::DEFAULT_MIN_ACCEPTANCE;

pub(super) const DEFAULT_WINDOW_SECS: f64 = classify::DEFAULT_WINDOW_SECS;
pub(super) const DEFAULT_OVERLAP_FACTOR: f64 = classify::DEFAULT_OVERLAP_FACTOR;
pub(super) const MAX_WINDOW_SECS: f64 = 60.0;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
pub const MIN_CHANNEL_CAPACITY: usize = 8;
pub const MAX_CHANNEL_CAPACITY: usize = 1024;

/// Upper bound for either run length (windows).
pub const MAX_RUN_LENGTH: u32 = 10_000;

pub(super) const MAX_LABEL_BYTES: usize = 128;
