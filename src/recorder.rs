//! Durable, append-only result recording.
//!
//! Every submitted rating becomes one CSV row appended to the result log.
//! The log is created with a header on first use and is never rewritten,
//! reordered or truncated; each append is flushed and synced before
//! `record` returns, so a crash can only ever lose the in-flight record.

use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::task::{DatasetName, EvalTask};

/// Lowest accepted rating.
pub const MIN_SCORE: u8 = 1;

/// Highest accepted rating.
pub const MAX_SCORE: u8 = 5;

/// Header row written once, only when the log file is created fresh.
const HEADER: &str = "Dataset,Class,Exp_Level,Score";

/// Errors that can occur while recording a score.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The score is outside the accepted 1..=5 range. Nothing is written.
    #[error("Invalid score {score}: must be between 1 and 5")]
    InvalidScore { score: u8 },

    /// Appending to the result log failed. The record is not durable and
    /// the submission must be treated as not having happened.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The durable tuple written per completed rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    /// Dataset the rated class belongs to.
    pub dataset: DatasetName,

    /// Full class directory name, as discovered.
    pub class_dir: String,

    /// Exposure level of the rated comparison image (1..=5).
    pub exposure_level: u8,

    /// The human judgment (1..=5).
    pub score: u8,
}

impl ScoreRecord {
    /// Builds the record for a rated task.
    pub fn from_task(task: &EvalTask, score: u8) -> Self {
        Self {
            dataset: task.dataset,
            class_dir: task.class_dir.clone(),
            exposure_level: task.exposure_level,
            score,
        }
    }

    /// The CSV row for this record, without trailing newline.
    fn csv_row(&self) -> String {
        format!(
            "{},{},{},{}",
            csv_field(self.dataset.as_str()),
            csv_field(&self.class_dir),
            self.exposure_level,
            self.score
        )
    }
}

/// Quotes a CSV field only when it needs it; embedded quotes are doubled.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Appends score records to a CSV log file.
#[derive(Debug, Clone)]
pub struct ResultRecorder {
    path: PathBuf,
}

impl ResultRecorder {
    /// Creates a recorder writing to `path`. The file itself is only
    /// touched on the first `record` call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates and durably appends one record.
    ///
    /// On success the row is flushed and synced to disk. On any error,
    /// previously written rows are untouched and no partial row remains
    /// visible as a complete record.
    pub fn record(&self, record: &ScoreRecord) -> Result<(), RecordError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&record.score) {
            return Err(RecordError::InvalidScore {
                score: record.score,
            });
        }

        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if is_new {
            writeln!(file, "{}", HEADER)?;
        }
        writeln!(file, "{}", record.csv_row())?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
}
