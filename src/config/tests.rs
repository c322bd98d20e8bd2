use super::{AppConfig, DEFAULT_CHANNEL_CAPACITY, MAX_RUN_LENGTH};
use clap::Parser;

fn parse(args: &[&str]) -> AppConfig {
    let mut argv = vec!["test-app"];
    argv.extend_from_slice(args);
    AppConfig::parse_from(argv)
}

#[test]
fn defaults_validate() {
    let mut cfg = parse(&[]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.label, "music");
    assert_eq!(cfg.input.as_os_str(), "-");
    assert_eq!(cfg.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    assert!(cfg.warnings().is_empty());
    assert!(cfg.presence_latches());
}

#[test]
fn detection_config_mirrors_flags() {
    let cfg = parse(&[
        "--presence-threshold",
        "0.7",
        "--absence-threshold",
        "0.2",
        "--presence-run-length",
        "3",
        "--absence-run-length",
        "5",
    ]);
    let detection = cfg.detection_config();
    assert_eq!(detection.presence_threshold, 0.7);
    assert_eq!(detection.absence_threshold, 0.2);
    assert_eq!(detection.presence_run_length, 3);
    assert_eq!(detection.absence_run_length, 5);
}

#[test]
fn adapter_config_carries_label_and_minimum() {
    let mut cfg = parse(&["--label", "dog_bark", "--min-confidence", "0.1", "--transitions-only"]);
    assert!(cfg.validate().is_ok());
    let adapter = cfg.adapter_config();
    assert_eq!(adapter.target.label_name, "dog_bark");
    assert_eq!(adapter.target.display_name, "Dog Bark");
    assert_eq!(adapter.min_acceptance, 0.1);
    assert!(adapter.transitions_only);
    assert!(!cfg.presence_latches());
}

#[test]
fn rejects_thresholds_outside_unit_interval() {
    let mut cfg = parse(&["--presence-threshold", "1.5"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--absence-threshold=-0.1"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--presence-threshold", "NaN"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_run_lengths_out_of_bounds() {
    let mut cfg = parse(&["--presence-run-length", "0"]);
    assert!(cfg.validate().is_err());

    let too_long = (MAX_RUN_LENGTH + 1).to_string();
    let mut cfg = parse(&["--absence-run-length", &too_long]);
    assert!(cfg.validate().is_err());

    let max = MAX_RUN_LENGTH.to_string();
    let mut cfg = parse(&["--absence-run-length", &max, "--presence-run-length", "1"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn inverted_thresholds_warn_unless_strict() {
    let mut cfg = parse(&["--presence-threshold", "0.4", "--absence-threshold", "0.6"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.warnings().len(), 1);

    let mut cfg = parse(&[
        "--presence-threshold",
        "0.4",
        "--absence-threshold",
        "0.4",
        "--strict-hysteresis",
    ]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--strict-hysteresis"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_min_confidence_of_one() {
    let mut cfg = parse(&["--min-confidence", "1.0"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_bad_window_geometry() {
    let mut cfg = parse(&["--window-secs", "0"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--window-secs", "61"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--overlap", "1.0"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--window-secs", "2.0", "--overlap", "0.5"]);
    assert!(cfg.validate().is_ok());
    assert!((cfg.analysis_window().hop_secs() - 1.0).abs() < 1e-9);
}

#[test]
fn rejects_channel_capacity_out_of_bounds() {
    let mut cfg = parse(&["--channel-capacity", "4"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--channel-capacity", "4096"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn trims_label_and_rejects_bad_characters() {
    let mut cfg = parse(&["--label", "  speech  "]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.label, "speech");

    let mut cfg = parse(&["--label", "music;rm"]);
    assert!(cfg.validate().is_err());

    let mut cfg = parse(&["--label", "   "]);
    assert!(cfg.validate().is_err());
}
