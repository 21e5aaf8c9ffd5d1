//! Task repository scanner.
//!
//! Walks the recognized dataset directories under a root, derives one
//! evaluation task per present comparison image, and reports every
//! non-fatal discovery problem as a structured [`DiscoveryIssue`] so any
//! front-end can render them consistently.
//!
//! Candidate derivation (naming conventions, expected paths) is pure;
//! only the validation step touches the filesystem.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

use crate::task::{
    sample_file_name, DatasetName, EvalTask, MAX_EXPOSURE_LEVEL, MIN_EXPOSURE_LEVEL,
};

/// Errors that can occur while scanning the task repository.
///
/// Missing datasets, malformed class directories and missing images are
/// not errors; they surface as [`DiscoveryIssue`] values instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Reading an existing dataset directory failed.
    #[error("Failed to read dataset directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal problem found during discovery.
///
/// Issues are informational only and never block the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscoveryIssue {
    /// A recognized dataset directory does not exist under the root.
    MissingDataset { dataset: DatasetName },

    /// A class directory name does not follow `<prefix>_<class_id>`.
    MalformedClassDir {
        dataset: DatasetName,
        class_dir: String,
    },

    /// The reference image (exposure level 0) is absent; the whole class
    /// is skipped, comparison images included.
    MissingReference {
        dataset: DatasetName,
        class_dir: String,
    },
}

impl fmt::Display for DiscoveryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryIssue::MissingDataset { dataset } => {
                write!(f, "dataset directory '{}' not found, skipping", dataset)
            }
            DiscoveryIssue::MalformedClassDir { dataset, class_dir } => write!(
                f,
                "class directory '{}/{}' does not follow '<prefix>_<class_id>' naming, skipping",
                dataset, class_dir
            ),
            DiscoveryIssue::MissingReference { dataset, class_dir } => write!(
                f,
                "missing reference image (exp_0) in '{}/{}', skipping class",
                dataset, class_dir
            ),
        }
    }
}

/// Complete output of a scan: the task list plus every discovery issue.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Discovered tasks, in dataset order, then sorted class order, then
    /// ascending exposure level. Not yet shuffled.
    pub tasks: Vec<EvalTask>,

    /// Non-fatal problems encountered along the way.
    pub issues: Vec<DiscoveryIssue>,
}

/// Scans a fixed set of dataset directories for evaluation tasks.
#[derive(Debug, Clone)]
pub struct TaskScanner {
    root: PathBuf,
    datasets: Vec<DatasetName>,
}

impl TaskScanner {
    /// Creates a scanner over `root` for the given datasets.
    pub fn new(root: impl Into<PathBuf>, datasets: Vec<DatasetName>) -> Self {
        Self {
            root: root.into(),
            datasets,
        }
    }

    /// Runs discovery across all configured datasets.
    ///
    /// Every task in the returned report references image files that
    /// existed on disk at scan time. An empty task list is a valid
    /// outcome, not an error.
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        let mut tasks = Vec::new();
        let mut issues = Vec::new();

        for &dataset in &self.datasets {
            let dataset_dir = self.root.join(dataset.as_str());
            if !dataset_dir.is_dir() {
                let issue = DiscoveryIssue::MissingDataset { dataset };
                warn!(dataset = %dataset, "{}", issue);
                issues.push(issue);
                continue;
            }

            for class_dir in sorted_class_dirs(&dataset_dir)? {
                self.scan_class(dataset, &dataset_dir, class_dir, &mut tasks, &mut issues);
            }
        }

        Ok(ScanReport { tasks, issues })
    }

    /// Validates one class directory and emits its tasks.
    fn scan_class(
        &self,
        dataset: DatasetName,
        dataset_dir: &Path,
        class_dir: String,
        tasks: &mut Vec<EvalTask>,
        issues: &mut Vec<DiscoveryIssue>,
    ) {
        let Some(class_id) = class_id_from_dir(&class_dir) else {
            let issue = DiscoveryIssue::MalformedClassDir {
                dataset,
                class_dir: class_dir.clone(),
            };
            warn!(dataset = %dataset, class_dir = %class_dir, "{}", issue);
            issues.push(issue);
            return;
        };
        let class_id = class_id.to_string();

        let class_path = dataset_dir.join(&class_dir);
        let reference_path = class_path.join(sample_file_name(&class_id, 0));
        if !reference_path.is_file() {
            let issue = DiscoveryIssue::MissingReference {
                dataset,
                class_dir: class_dir.clone(),
            };
            warn!(dataset = %dataset, class_dir = %class_dir, "{}", issue);
            issues.push(issue);
            return;
        }

        for (exposure_level, target_path) in comparison_candidates(&class_path, &class_id) {
            // Absent exposure levels are simply omitted.
            if target_path.is_file() {
                tasks.push(EvalTask {
                    dataset,
                    class_dir: class_dir.clone(),
                    class_id: class_id.clone(),
                    exposure_level,
                    reference_path: reference_path.clone(),
                    target_path,
                });
            }
        }
    }
}

/// Extracts the class ID from a class directory name.
///
/// The ID is the second `_`-delimited token (e.g. "class_0" -> "0");
/// names without a second token have no ID.
pub(crate) fn class_id_from_dir(name: &str) -> Option<&str> {
    let mut parts = name.split('_');
    parts.next()?;
    parts.next()
}

/// Expected comparison-image candidates for a class, one per exposure
/// level, before any existence check.
fn comparison_candidates(class_path: &Path, class_id: &str) -> Vec<(u8, PathBuf)> {
    (MIN_EXPOSURE_LEVEL..=MAX_EXPOSURE_LEVEL)
        .map(|level| (level, class_path.join(sample_file_name(class_id, level))))
        .collect()
}

/// Immediate subdirectory names of a dataset directory, in stable sorted
/// order. Plain files are ignored.
fn sorted_class_dirs(dataset_dir: &Path) -> Result<Vec<String>, ScanError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dataset_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ScanError::ReadDir {
            path: dataset_dir.to_path_buf(),
            source: std::io::Error::from(e),
        })?;
        if entry.file_type().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
