//! File Statistics Record - per-measurement-file current statistics

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Mode;
use crate::stats::SampleStats;

/// Current statistics for one raw measurement file.
///
/// One record per file; never mutated after creation. Repeated files for
/// the same `(algorithm, mode, message_size)` condition are independent
/// runs and stay as separate records until aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStatsRecord {
    /// Algorithm label as configured for the file's folder.
    pub algorithm: String,
    /// Operation mode inferred from the filename.
    pub mode: Mode,
    /// Message size in bytes inferred from the filename (zero for baseline).
    pub message_size: u64,
    /// Source file the statistics were computed from.
    pub source: PathBuf,
    /// Mean current in milliamps (trimmed when configured).
    pub mean_ma: f64,
    /// Sample standard deviation in milliamps.
    pub std_ma: f64,
    /// Number of current samples in the file.
    pub sample_count: usize,
}

impl FileStatsRecord {
    /// Build a record from per-file statistics.
    #[must_use]
    pub fn new(
        algorithm: impl Into<String>,
        mode: Mode,
        message_size: u64,
        source: PathBuf,
        stats: SampleStats,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            mode,
            message_size,
            source,
            mean_ma: stats.mean_ma,
            std_ma: stats.std_ma,
            sample_count: stats.sample_count,
        }
    }

    /// Grouping key for run aggregation.
    #[must_use]
    pub fn condition(&self) -> (String, Mode, u64) {
        (self.algorithm.clone(), self.mode, self.message_size)
    }
}
