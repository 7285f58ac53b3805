//! Timing Record - externally-measured execution time per condition

use serde::{Deserialize, Serialize};

/// One row of the independently-collected timing dataset.
///
/// The algorithm label is stored in normalized form with its mode suffix
/// (`AES128-GCM-ENC`), ready for the reconciliation join. Sources without
/// mode granularity are duplicated into both `-ENC` and `-DEC` rows at
/// load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    /// Normalized algorithm label including mode suffix.
    pub algorithm: String,
    /// Message size in bytes.
    pub message_size: u64,
    /// Number of repetitions the average was taken over.
    pub repetitions: u64,
    /// Average execution time in microseconds.
    pub average_time_us: f64,
}
