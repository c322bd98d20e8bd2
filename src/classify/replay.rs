//! Replays recorded classifier output from newline-delimited JSON.
//!
//! Each line is one analysis window or one terminal condition:
//!
//! ```text
//! {"type":"result","confidences":{"music":0.82},"time_secs":0.15}
//! {"type":"interrupted"}
//! ```

use super::{AnalysisWindow, ClassificationError, ClassificationResult, ClassificationSource};
use crate::{log_debug, log_debug_content};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One line of a replay file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayRecord {
    Result {
        confidences: BTreeMap<String, f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_secs: Option<f64>,
    },
    Interrupted,
    Denied {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Error {
        message: String,
    },
}

enum ReplayInput {
    /// A file path, or `-` for stdin.
    Path(PathBuf),
    Records(VecDeque<ReplayRecord>),
}

/// [`ClassificationSource`] backed by recorded windows.
pub struct ReplaySource {
    input: ReplayInput,
    reader: Option<Box<dyn BufRead + Send>>,
    window: AnalysisWindow,
    next_index: u64,
    line_number: usize,
}

impl ReplaySource {
    pub fn from_path(path: impl AsRef<Path>, window: AnalysisWindow) -> Self {
        Self::with_input(ReplayInput::Path(path.as_ref().to_path_buf()), window)
    }

    pub fn from_records(
        records: impl IntoIterator<Item = ReplayRecord>,
        window: AnalysisWindow,
    ) -> Self {
        Self::with_input(ReplayInput::Records(records.into_iter().collect()), window)
    }

    fn with_input(input: ReplayInput, window: AnalysisWindow) -> Self {
        Self {
            input,
            reader: None,
            window,
            next_index: 0,
            line_number: 0,
        }
    }

    fn convert(
        &mut self,
        record: ReplayRecord,
    ) -> Result<ClassificationResult, ClassificationError> {
        match record {
            ReplayRecord::Result {
                confidences,
                time_secs,
            } => {
                let window_start = match time_secs {
                    Some(secs) => Duration::try_from_secs_f64(secs).map_err(|_| {
                        ClassificationError::Classifier(format!(
                            "time_secs {secs} out of range on line {}",
                            self.line_number
                        ))
                    })?,
                    None => self.window.window_start(self.next_index),
                };
                self.next_index += 1;
                let mut result = ClassificationResult::new(window_start);
                for (label, confidence) in confidences {
                    result.insert(label, confidence);
                }
                Ok(result)
            }
            ReplayRecord::Interrupted => Err(ClassificationError::StreamInterrupted),
            ReplayRecord::Denied { reason } => Err(ClassificationError::AccessDenied(
                reason.unwrap_or_else(|| "capture device".to_string()),
            )),
            ReplayRecord::Error { message } => Err(ClassificationError::Classifier(message)),
        }
    }

    fn next_line_record(&mut self) -> Option<Result<ReplayRecord, ClassificationError>> {
        let reader = self.reader.as_mut()?;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    log_debug(&format!("replay read failed: {err}"));
                    return Some(Err(ClassificationError::StreamInterrupted));
                }
            }
            self.line_number += 1;
            let Ok(line) = std::str::from_utf8(&buf) else {
                return Some(Err(ClassificationError::Classifier(format!(
                    "malformed replay record on line {}: invalid UTF-8",
                    self.line_number
                ))));
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(serde_json::from_str(trimmed).map_err(|err| {
                log_debug_content(&format!("replay line {}: {trimmed}", self.line_number));
                ClassificationError::Classifier(format!(
                    "malformed replay record on line {}: {err}",
                    self.line_number
                ))
            }));
        }
    }
}

impl ClassificationSource for ReplaySource {
    fn open(&mut self) -> Result<(), ClassificationError> {
        let ReplayInput::Path(path) = &self.input else {
            return Ok(());
        };
        if path.as_os_str() == "-" {
            self.reader = Some(Box::new(BufReader::new(io::stdin())));
            return Ok(());
        }
        let file = File::open(path).map_err(|err| {
            ClassificationError::AccessDenied(format!("{}: {err}", path.display()))
        })?;
        log_debug(&format!("replaying classifier output from {}", path.display()));
        self.reader = Some(Box::new(BufReader::new(file)));
        Ok(())
    }

    fn next_event(&mut self) -> Option<Result<ClassificationResult, ClassificationError>> {
        let queued = match &mut self.input {
            ReplayInput::Records(records) => {
                self.line_number += 1;
                Some(records.pop_front())
            }
            ReplayInput::Path(_) => None,
        };
        let record = match queued {
            Some(next) => Ok(next?),
            None => self.next_line_record()?,
        };
        Some(record.and_then(|record| self.convert(record)))
    }

    fn name(&self) -> &'static str {
        "replay_source"
    }
}
