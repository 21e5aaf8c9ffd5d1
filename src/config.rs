//! Evaluation session configuration.
//!
//! All previously-global settings (dataset list, result-file path) live in
//! an explicit [`EvalConfig`] passed into the session, so multiple isolated
//! sessions and tests can run without shared on-disk state.

use std::path::PathBuf;

use thiserror::Error;

use crate::task::DatasetName;

/// Default result log file name.
pub const DEFAULT_RESULT_FILE: &str = "humaneval_results.csv";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for an evaluation session.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Root directory containing the dataset folders.
    pub root_dir: PathBuf,

    /// Datasets to scan, in order. Defaults to all recognized datasets.
    pub datasets: Vec<DatasetName>,

    /// CSV file ratings are appended to.
    pub result_file: PathBuf,

    /// Fixed shuffle seed; `None` means a fresh order each run.
    pub shuffle_seed: Option<u64>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            datasets: DatasetName::ALL.to_vec(),
            result_file: PathBuf::from(DEFAULT_RESULT_FILE),
            shuffle_seed: None,
        }
    }
}

impl EvalConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HUMANEVAL_ROOT`: Root directory (default: current directory)
    /// - `HUMANEVAL_DATASETS`: Comma-separated dataset subset (default: all)
    /// - `HUMANEVAL_RESULT_FILE`: Result CSV path (default: humaneval_results.csv)
    /// - `HUMANEVAL_SEED`: Fixed shuffle seed (default: unset)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HUMANEVAL_ROOT") {
            config.root_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("HUMANEVAL_DATASETS") {
            config.datasets = parse_datasets(&val)?;
        }

        if let Ok(val) = std::env::var("HUMANEVAL_RESULT_FILE") {
            config.result_file = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("HUMANEVAL_SEED") {
            let seed = val
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "HUMANEVAL_SEED".to_string(),
                    message: e.to_string(),
                })?;
            config.shuffle_seed = Some(seed);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.datasets.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "datasets must not be empty".to_string(),
            ));
        }

        if self.result_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "result_file must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parses a comma-separated dataset list.
fn parse_datasets(value: &str) -> Result<Vec<DatasetName>, ConfigError> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DatasetName>().map_err(|e| ConfigError::InvalidValue {
                key: "HUMANEVAL_DATASETS".to_string(),
                message: e,
            })
        })
        .collect()
}
