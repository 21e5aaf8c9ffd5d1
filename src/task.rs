//! Common types for the evaluation task pipeline.
//!
//! This module defines the fixed dataset enumeration, the immutable
//! evaluation task record, and the filename conventions shared by the
//! scanner and the front-ends.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lowest comparison exposure level. Level 0 is reserved for the reference.
pub const MIN_EXPOSURE_LEVEL: u8 = 1;

/// Highest comparison exposure level.
pub const MAX_EXPOSURE_LEVEL: u8 = 5;

/// Recognized dataset directories, in fixed enumeration order.
///
/// Top-level directories with any other name are ignored during scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetName {
    #[serde(rename = "MNIST")]
    Mnist,
    #[serde(rename = "FashionMNIST")]
    FashionMnist,
    #[serde(rename = "SVHN")]
    Svhn,
    #[serde(rename = "CIFAR10")]
    Cifar10,
    #[serde(rename = "Imagenet")]
    Imagenet,
}

impl DatasetName {
    /// All recognized datasets, in scan order.
    pub const ALL: [DatasetName; 5] = [
        DatasetName::Mnist,
        DatasetName::FashionMnist,
        DatasetName::Svhn,
        DatasetName::Cifar10,
        DatasetName::Imagenet,
    ];

    /// The on-disk directory name for this dataset.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetName::Mnist => "MNIST",
            DatasetName::FashionMnist => "FashionMNIST",
            DatasetName::Svhn => "SVHN",
            DatasetName::Cifar10 => "CIFAR10",
            DatasetName::Imagenet => "Imagenet",
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetName::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unrecognized dataset '{}'", s))
    }
}

/// Expected file name for a sample image at the given exposure level.
///
/// Level 0 is the reference image; levels 1..=5 are the comparison variants.
pub fn sample_file_name(class_id: &str, level: u8) -> String {
    format!("sample_{}_exp_{}.png", class_id, level)
}

/// One reference-vs-comparison pair to be rated.
///
/// Tasks are constructed by the scanner only for comparison images that
/// exist on disk alongside a present reference image, and are immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalTask {
    /// Dataset the class belongs to.
    pub dataset: DatasetName,

    /// Full class directory name (e.g. "class_7"); recorded as-is in the
    /// result log.
    pub class_dir: String,

    /// Class identifier extracted from the directory name.
    pub class_id: String,

    /// Which comparison variant this task targets (1..=5).
    pub exposure_level: u8,

    /// Path to the reference image (exposure level 0), shared by all tasks
    /// of the same class.
    pub reference_path: PathBuf,

    /// Path to the comparison image for this exposure level.
    pub target_path: PathBuf,
}
