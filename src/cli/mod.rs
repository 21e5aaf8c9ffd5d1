//! Command-line interface for humaneval.
//!
//! Provides the interactive rating front-end and a discovery dry-run
//! command. This is presentation-layer code only: it drives the core
//! exclusively through the public session API.

mod commands;

pub use commands::{parse_cli, run, run_with_cli};
