//! humaneval: human evaluation harness for generative model outputs.
//!
//! This library discovers paired reference/comparison images across a
//! directory tree, serves them one at a time in randomized order, and
//! records 1-5 semantic preservation ratings to an append-only CSV log.
//! Front-ends (the bundled CLI, or any other presentation layer) drive the
//! workflow exclusively through [`session::EvalSession`].

pub mod cli;
pub mod config;
pub mod recorder;
pub mod scanner;
pub mod sequencer;
pub mod session;
pub mod task;

// Re-export the types front-ends need to drive a session
pub use config::{ConfigError, EvalConfig};
pub use recorder::{RecordError, ResultRecorder, ScoreRecord, MAX_SCORE, MIN_SCORE};
pub use scanner::{DiscoveryIssue, ScanError, ScanReport, TaskScanner};
pub use sequencer::TaskSequence;
pub use session::{EvalSession, SessionError, SessionState};
pub use task::{DatasetName, EvalTask};
