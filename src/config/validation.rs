use super::defaults::{MAX_LABEL_BYTES, MAX_WINDOW_SECS};
use super::{AppConfig, MAX_CHANNEL_CAPACITY, MAX_RUN_LENGTH, MIN_CHANNEL_CAPACITY};
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the label.
    pub fn validate(&mut self) -> Result<()> {
        check_unit_interval("--presence-threshold", self.presence_threshold)?;
        check_unit_interval("--absence-threshold", self.absence_threshold)?;

        if !(1..=MAX_RUN_LENGTH).contains(&self.presence_run_length) {
            bail!(
                "--presence-run-length must be between 1 and {MAX_RUN_LENGTH}, got {}",
                self.presence_run_length
            );
        }
        if !(1..=MAX_RUN_LENGTH).contains(&self.absence_run_length) {
            bail!(
                "--absence-run-length must be between 1 and {MAX_RUN_LENGTH}, got {}",
                self.absence_run_length
            );
        }

        if !self.min_confidence.is_finite() || !(0.0..1.0).contains(&self.min_confidence) {
            bail!(
                "--min-confidence must be between 0.0 and 1.0 (exclusive), got {}",
                self.min_confidence
            );
        }

        if self.strict_hysteresis && !self.detection_config().has_hysteresis_margin() {
            bail!(
                "--absence-threshold ({}) must be below --presence-threshold ({}) with --strict-hysteresis",
                self.absence_threshold,
                self.presence_threshold
            );
        }

        if !self.window_secs.is_finite()
            || self.window_secs <= 0.0
            || self.window_secs > MAX_WINDOW_SECS
        {
            bail!(
                "--window-secs must be greater than 0 and at most {MAX_WINDOW_SECS}, got {}",
                self.window_secs
            );
        }
        if !self.overlap.is_finite() || !(0.0..1.0).contains(&self.overlap) {
            bail!(
                "--overlap must be at least 0.0 and below 1.0, got {}",
                self.overlap
            );
        }

        if !(MIN_CHANNEL_CAPACITY..=MAX_CHANNEL_CAPACITY).contains(&self.channel_capacity) {
            bail!(
                "--channel-capacity must be between {MIN_CHANNEL_CAPACITY} and {MAX_CHANNEL_CAPACITY}, got {}",
                self.channel_capacity
            );
        }

        let label = self.label.trim();
        if label.is_empty() {
            bail!("--label must not be empty");
        }
        if label.len() > MAX_LABEL_BYTES {
            bail!("--label must be at most {MAX_LABEL_BYTES} bytes");
        }
        if !label
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            bail!("--label must contain only ASCII letters, digits, '_' or '-'");
        }
        self.label = label.to_string();

        Ok(())
    }

    /// Settings that validate but make the detector hard to use. Reported
    /// after logging is up, never rejected.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.detection_config().has_hysteresis_margin() {
            warnings.push(format!(
                "absence threshold {} is not below presence threshold {}; detection may flicker",
                self.absence_threshold, self.presence_threshold
            ));
        }
        warnings
    }

    /// With the minimum confidence at or above the absence threshold, no
    /// accepted window can count as absence, so an onset is never followed
    /// by an end. This is the default behavior (0.5 vs 0.3).
    pub fn presence_latches(&self) -> bool {
        self.min_confidence >= self.absence_threshold
    }
}

fn check_unit_interval(flag: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        bail!("{flag} must be between 0.0 and 1.0, got {value}");
    }
    Ok(())
}
