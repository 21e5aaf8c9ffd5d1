//! Session controller.
//!
//! Orchestrates the scanner, sequencer and recorder behind a small state
//! machine: `Running` while tasks remain, `Empty` when discovery found
//! nothing (terminal, entered at startup), `Complete` once every task has
//! been rated (terminal).

use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::EvalConfig;
use crate::recorder::{RecordError, ResultRecorder, ScoreRecord};
use crate::scanner::{DiscoveryIssue, ScanError, TaskScanner};
use crate::sequencer::TaskSequence;
use crate::task::EvalTask;

/// Errors that can occur during a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Task discovery failed with a real I/O problem.
    #[error("Task discovery failed: {0}")]
    Scan(#[from] ScanError),

    /// Recording a score failed; the cursor has not advanced and the
    /// submission may be retried.
    #[error("Failed to record score: {0}")]
    Record(#[from] RecordError),

    /// `submit` was called outside the `Running` state.
    #[error("Cannot submit a score while the session is {state}")]
    NotRunning { state: SessionState },
}

/// Lifecycle state of an evaluation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Tasks remain to be rated.
    Running,
    /// Discovery found no tasks at all. Terminal.
    Empty,
    /// Every task has been rated. Terminal.
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Running => write!(f, "running"),
            SessionState::Empty => write!(f, "empty"),
            SessionState::Complete => write!(f, "complete"),
        }
    }
}

/// A single-rater evaluation session over one shuffled task sequence.
pub struct EvalSession {
    sequence: TaskSequence,
    recorder: ResultRecorder,
    issues: Vec<DiscoveryIssue>,
    state: SessionState,
}

impl EvalSession {
    /// Discovers tasks, shuffles them and prepares the recorder.
    ///
    /// Discovery issues are logged as warnings and kept for front-ends to
    /// render; they never prevent the session from starting. The session
    /// starts in `Empty` when no tasks were found, `Running` otherwise.
    pub fn start(config: EvalConfig) -> Result<Self, SessionError> {
        let scanner = TaskScanner::new(&config.root_dir, config.datasets.clone());
        let report = scanner.scan()?;

        let sequence = TaskSequence::shuffled(report.tasks, config.shuffle_seed);
        let recorder = ResultRecorder::new(&config.result_file);

        let state = if sequence.is_empty() {
            warn!(root = %config.root_dir.display(), "no evaluation tasks discovered");
            SessionState::Empty
        } else {
            info!(
                task_count = sequence.len(),
                result_file = %config.result_file.display(),
                "evaluation session started"
            );
            SessionState::Running
        };

        Ok(Self {
            sequence,
            recorder,
            issues: report.issues,
            state,
        })
    }

    /// The task currently awaiting a rating; `None` in terminal states.
    pub fn current_task(&self) -> Option<&EvalTask> {
        match self.state {
            SessionState::Running => self.sequence.current(),
            SessionState::Empty | SessionState::Complete => None,
        }
    }

    /// `(completed, total)` counts for progress display.
    pub fn progress(&self) -> (usize, usize) {
        self.sequence.progress()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is in a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Empty | SessionState::Complete)
    }

    /// Non-fatal problems found during discovery.
    pub fn issues(&self) -> &[DiscoveryIssue] {
        &self.issues
    }

    /// Path of the result log this session appends to.
    pub fn result_path(&self) -> &Path {
        self.recorder.path()
    }

    /// Validates and durably records a rating for the current task, then
    /// advances to the next one.
    ///
    /// The cursor only moves once the record is durable on disk, so every
    /// completed task has exactly one corresponding log row. Returns the
    /// post-submit state so callers can detect completion directly.
    pub fn submit(&mut self, score: u8) -> Result<SessionState, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::NotRunning { state: self.state });
        }

        let Some(task) = self.sequence.current() else {
            // Unreachable while the state invariant holds; report the
            // boundary instead of panicking.
            return Err(SessionError::NotRunning {
                state: SessionState::Complete,
            });
        };

        let record = ScoreRecord::from_task(task, score);
        self.recorder.record(&record)?;
        self.sequence.advance();

        if self.sequence.is_exhausted() {
            self.state = SessionState::Complete;
            info!(total = self.sequence.len(), "evaluation complete");
        }

        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::DatasetName;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(path, b"").expect("Failed to create file");
    }

    /// One MNIST class with a reference and the given comparison levels.
    fn write_class(root: &Path, class: u32, levels: &[u8]) {
        let dir = root.join("MNIST").join(format!("class_{}", class));
        touch(&dir.join(format!("sample_{}_exp_0.png", class)));
        for level in levels {
            touch(&dir.join(format!("sample_{}_exp_{}.png", class, level)));
        }
    }

    fn test_config(root: &Path) -> EvalConfig {
        EvalConfig {
            root_dir: root.to_path_buf(),
            datasets: vec![DatasetName::Mnist],
            result_file: root.join("results.csv"),
            shuffle_seed: Some(42),
        }
    }

    #[test]
    fn test_empty_session_is_terminal() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = test_config(temp_dir.path());
        let result_file = config.result_file.clone();

        let mut session = EvalSession::start(config).expect("Start should succeed");

        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.is_finished());
        assert!(session.current_task().is_none());
        assert_eq!(session.progress(), (0, 0));

        let result = session.submit(3);
        assert!(matches!(
            result,
            Err(SessionError::NotRunning {
                state: SessionState::Empty
            })
        ));
        assert!(!result_file.exists());
    }

    #[test]
    fn test_full_rating_pass() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_class(temp_dir.path(), 7, &[1, 3]);
        let config = test_config(temp_dir.path());
        let result_file = config.result_file.clone();

        let mut session = EvalSession::start(config).expect("Start should succeed");
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.progress(), (0, 2));

        let state = session.submit(4).expect("Submit should succeed");
        assert_eq!(state, SessionState::Running);
        assert_eq!(session.progress(), (1, 2));

        let state = session.submit(2).expect("Submit should succeed");
        assert_eq!(state, SessionState::Complete);
        assert!(session.is_finished());
        assert!(session.current_task().is_none());
        assert_eq!(session.progress(), (2, 2));

        let contents = fs::read_to_string(&result_file).expect("Log should exist");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Dataset,Class,Exp_Level,Score");
        // Shuffled order; both rated tasks are logged in submission order
        // with the scores 4 then 2.
        assert!(lines[1].starts_with("MNIST,class_7,"));
        assert!(lines[1].ends_with(",4"));
        assert!(lines[2].starts_with("MNIST,class_7,"));
        assert!(lines[2].ends_with(",2"));
    }

    #[test]
    fn test_invalid_score_leaves_cursor_and_log_unchanged() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_class(temp_dir.path(), 0, &[1]);
        let config = test_config(temp_dir.path());
        let result_file = config.result_file.clone();

        let mut session = EvalSession::start(config).expect("Start should succeed");
        for score in [0, 6] {
            let result = session.submit(score);
            assert!(matches!(
                result,
                Err(SessionError::Record(RecordError::InvalidScore { .. }))
            ));
        }
        assert_eq!(session.progress(), (0, 1));
        assert_eq!(session.state(), SessionState::Running);
        assert!(!result_file.exists());

        // A valid retry still works.
        session.submit(5).expect("Submit should succeed");
        assert_eq!(session.state(), SessionState::Complete);
    }

    #[test]
    fn test_submit_after_complete_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_class(temp_dir.path(), 0, &[2]);
        let config = test_config(temp_dir.path());
        let result_file = config.result_file.clone();

        let mut session = EvalSession::start(config).expect("Start should succeed");
        session.submit(3).expect("Submit should succeed");

        let before = fs::read(&result_file).expect("Log should exist");
        let result = session.submit(3);
        assert!(matches!(
            result,
            Err(SessionError::NotRunning {
                state: SessionState::Complete
            })
        ));
        let after = fs::read(&result_file).expect("Log should exist");
        assert_eq!(before, after);
        assert_eq!(session.progress(), (1, 1));
    }

    #[test]
    fn test_write_failure_does_not_advance_cursor() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_class(temp_dir.path(), 0, &[1]);
        let mut config = test_config(temp_dir.path());
        // Pointing the log at a directory makes every append fail.
        let blocked = temp_dir.path().join("blocked");
        fs::create_dir_all(&blocked).expect("Failed to create dir");
        config.result_file = blocked;

        let mut session = EvalSession::start(config).expect("Start should succeed");
        let result = session.submit(3);
        assert!(matches!(
            result,
            Err(SessionError::Record(RecordError::Io(_)))
        ));
        assert_eq!(session.progress(), (0, 1));
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.current_task().is_some());
    }

    #[test]
    fn test_issues_are_kept_for_front_ends() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_class(temp_dir.path(), 1, &[1]);
        let mut config = test_config(temp_dir.path());
        config.datasets = vec![DatasetName::Mnist, DatasetName::Svhn];

        let session = EvalSession::start(config).expect("Start should succeed");
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(
            session.issues(),
            &[DiscoveryIssue::MissingDataset {
                dataset: DatasetName::Svhn
            }]
        );
    }
}
