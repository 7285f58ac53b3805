//! Error types for Vatio
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Vatio error types
///
/// File-level failures (`Parse`) are isolated per file in batch mode;
/// dataset-level failures (`MissingBaseline`, `MissingColumns`, `Config`)
/// abort the whole run. Join mismatches and numeric anomalies are
/// diagnostics carried in the output, never errors.
#[derive(Error, Debug)]
pub enum Error {
    /// A source file exists but yielded no usable samples or columns
    #[error("parse error in {}: {reason}", .path.display())]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Baseline capture required but not found
    #[error(
        "baseline file not found: {}\nEnergy correction needs an idle-current capture. \
         Record one, or opt into allow_zero_baseline explicitly.",
        .0.display()
    )]
    MissingBaseline(PathBuf),

    /// A tabular dataset lacks required columns
    #[error("{}: missing required column(s): {}", .path.display(), .missing.join(", "))]
    MissingColumns {
        /// Dataset that failed validation
        path: PathBuf,
        /// Logical names of the absent columns
        missing: Vec<String>,
    },

    /// Trim fraction outside the valid range
    #[error("trim fraction must be in [0, 0.5), got {0}")]
    InvalidTrimFraction(f64),

    /// Other configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
