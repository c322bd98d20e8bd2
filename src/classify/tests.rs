use super::{
    spawn_source, AnalysisWindow, ClassificationError, ClassificationEvent, ClassificationResult,
    ClassificationSource, ReplayRecord, ReplaySource, SoundIdentifier,
};
use crate::adapter::{spawn_detection_worker, AdapterConfig, DetectionMessage};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn result_record(label: &str, confidence: f64) -> ReplayRecord {
    let mut confidences = BTreeMap::new();
    confidences.insert(label.to_string(), confidence);
    ReplayRecord::Result {
        confidences,
        time_secs: None,
    }
}

fn temp_replay_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    env::temp_dir().join(format!(
        "soundwatch_replay_{tag}_{}_{nanos}.jsonl",
        std::process::id()
    ))
}

fn drain(source: ReplaySource) -> Vec<ClassificationEvent> {
    let (rx, mut handle) = spawn_source(source, 8);
    let events: Vec<_> = rx.iter().collect();
    handle.join().expect("source thread");
    events
}

#[test]
fn display_name_capitalizes_words() {
    assert_eq!(SoundIdentifier::new("music").display_name, "Music");
    assert_eq!(SoundIdentifier::new("dog_bark").display_name, "Dog Bark");
    assert_eq!(
        SoundIdentifier::display_name_for_label("SPEECH_synthesizer"),
        "Speech Synthesizer"
    );
    assert_eq!(SoundIdentifier::display_name_for_label(""), "");
}

#[test]
fn window_start_follows_hop() {
    let window = AnalysisWindow::default();
    assert!((window.hop_secs() - 0.15).abs() < 1e-9);
    let start = window.window_start(10);
    assert!((start.as_secs_f64() - 1.5).abs() < 1e-6);
    assert_eq!(window.window_start(0), Duration::ZERO);
}

#[test]
fn result_reports_missing_labels_as_none() {
    let result = ClassificationResult::new(Duration::ZERO)
        .with_confidence("music", 0.4)
        .with_confidence("speech", 0.7);
    assert_eq!(result.confidence("music"), Some(0.4));
    assert_eq!(result.confidence("laughter"), None);
}

#[test]
fn error_kinds_are_stable() {
    assert_eq!(ClassificationError::StreamInterrupted.kind(), "stream_interrupted");
    assert_eq!(
        ClassificationError::AccessDenied("mic".into()).kind(),
        "access_denied"
    );
    assert_eq!(
        ClassificationError::AccessDenied("mic".into()).to_string(),
        "access denied: mic"
    );
}

#[test]
fn record_source_completes_after_last_result() {
    let source = ReplaySource::from_records(
        vec![result_record("music", 0.8), result_record("music", 0.2)],
        AnalysisWindow::default(),
    );
    let events = drain(source);
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], ClassificationEvent::Result(_)));
    assert_eq!(events[2], ClassificationEvent::Completed);
    if let ClassificationEvent::Result(result) = &events[1] {
        assert!((result.window_start().as_secs_f64() - 0.15).abs() < 1e-6);
    } else {
        panic!("expected a result");
    }
}

#[test]
fn interruption_ends_stream_once() {
    let source = ReplaySource::from_records(
        vec![
            result_record("music", 0.8),
            ReplayRecord::Interrupted,
            result_record("music", 0.9),
        ],
        AnalysisWindow::default(),
    );
    let events = drain(source);
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        ClassificationEvent::Failed(ClassificationError::StreamInterrupted)
    );
}

#[test]
fn missing_file_is_access_failure_before_results() {
    let path = temp_replay_path("missing");
    let events = drain(ReplaySource::from_path(&path, AnalysisWindow::default()));
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        ClassificationEvent::Failed(ClassificationError::AccessDenied(_))
    ));
}

#[test]
fn file_source_parses_lines_and_skips_comments() {
    let path = temp_replay_path("parse");
    fs::write(
        &path,
        "# recorded session\n\
         {\"type\":\"result\",\"confidences\":{\"music\":0.91},\"time_secs\":2.5}\n\
         \n\
         {\"type\":\"result\",\"confidences\":{\"speech\":0.6}}\n",
    )
    .expect("write replay file");

    let events = drain(ReplaySource::from_path(&path, AnalysisWindow::default()));
    let _ = fs::remove_file(&path);

    assert_eq!(events.len(), 3);
    match &events[0] {
        ClassificationEvent::Result(result) => {
            assert_eq!(result.confidence("music"), Some(0.91));
            assert_eq!(result.window_start(), Duration::from_secs_f64(2.5));
        }
        other => panic!("unexpected event {other:?}"),
    }
    match &events[1] {
        ClassificationEvent::Result(result) => {
            assert_eq!(result.confidence("speech"), Some(0.6));
            assert!((result.window_start().as_secs_f64() - 0.15).abs() < 1e-6);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(events[2], ClassificationEvent::Completed);
}

#[test]
fn malformed_line_reports_line_number() {
    let path = temp_replay_path("malformed");
    fs::write(
        &path,
        "{\"type\":\"result\",\"confidences\":{\"music\":0.7}}\nnot json\n",
    )
    .expect("write replay file");

    let events = drain(ReplaySource::from_path(&path, AnalysisWindow::default()));
    let _ = fs::remove_file(&path);

    assert_eq!(events.len(), 2);
    match &events[1] {
        ClassificationEvent::Failed(ClassificationError::Classifier(message)) => {
            assert!(message.contains("line 2"), "{message}");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn invalid_utf8_line_is_malformed_record() {
    let path = temp_replay_path("utf8");
    let mut bytes = b"{\"type\":\"result\",\"confidences\":{\"music\":0.7}}\n".to_vec();
    bytes.extend_from_slice(b"{\"type\":\"result\",\"confidences\":{\"m\xffsic\":0.7}}\n");
    fs::write(&path, bytes).expect("write replay file");

    let events = drain(ReplaySource::from_path(&path, AnalysisWindow::default()));
    let _ = fs::remove_file(&path);

    assert_eq!(events.len(), 2);
    match &events[1] {
        ClassificationEvent::Failed(ClassificationError::Classifier(message)) => {
            assert!(message.contains("line 2"), "{message}");
            assert!(message.contains("UTF-8"), "{message}");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn out_of_range_time_fails_stream_instead_of_finishing() {
    let mut confidences = BTreeMap::new();
    confidences.insert("music".to_string(), 0.9);
    let source = ReplaySource::from_records(
        vec![
            result_record("music", 0.9),
            ReplayRecord::Result {
                confidences,
                time_secs: Some(1e20),
            },
        ],
        AnalysisWindow::default(),
    );
    let (events, mut handle) = spawn_source(source, 8);
    let mut job = spawn_detection_worker(AdapterConfig::default(), events);
    let messages: Vec<_> = job.receiver.iter().collect();
    job.join().expect("detection worker");
    assert_eq!(handle.join().expect("source thread"), 1);

    match messages.last() {
        Some(DetectionMessage::Failed(ClassificationError::Classifier(message))) => {
            assert!(message.contains("out of range on line 2"), "{message}");
        }
        other => panic!("unexpected last message {other:?}"),
    }
    assert!(!messages.contains(&DetectionMessage::Finished));
}

#[test]
fn negative_time_is_rejected() {
    let mut confidences = BTreeMap::new();
    confidences.insert("music".to_string(), 0.9);
    let mut source = ReplaySource::from_records(
        vec![ReplayRecord::Result {
            confidences,
            time_secs: Some(-1.0),
        }],
        AnalysisWindow::default(),
    );
    assert!(matches!(
        source.next_event(),
        Some(Err(ClassificationError::Classifier(_)))
    ));
}

#[test]
fn window_start_saturates_instead_of_overflowing() {
    let window = AnalysisWindow {
        duration_secs: 1e300,
        overlap_factor: 0.0,
    };
    assert_eq!(window.window_start(1_000_000), Duration::MAX);
    assert_eq!(window.window_start(0), Duration::ZERO);
}

#[test]
fn stopped_source_disconnects_without_terminal_event() {
    let records: Vec<_> = (0..1000).map(|_| result_record("music", 0.9)).collect();
    let (rx, mut handle) = spawn_source(
        ReplaySource::from_records(records, AnalysisWindow::default()),
        1,
    );
    let first = rx.recv().expect("first result");
    assert!(matches!(first, ClassificationEvent::Result(_)));
    handle.request_stop();
    let rest: Vec<_> = rx.iter().collect();
    let delivered = handle.join().expect("source thread");
    assert!(delivered < 1000);
    assert!(rest.iter().all(|event| !event.is_terminal()));
}

#[test]
fn denied_record_maps_to_access_error() {
    let mut source = ReplaySource::from_records(
        vec![ReplayRecord::Denied { reason: None }],
        AnalysisWindow::default(),
    );
    assert!(source.open().is_ok());
    assert_eq!(
        source.next_event(),
        Some(Err(ClassificationError::AccessDenied(
            "capture device".to_string()
        )))
    );
    assert_eq!(source.next_event(), None);
}
