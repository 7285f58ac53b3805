//! Measurement record schema.
//!
//! Every table the pipeline produces is a vector of one of these record
//! types. Records are write-once: each is derived deterministically from
//! raw inputs and never updated in place; recomputation means re-running
//! the pipeline.
//!
//! ## Schema Overview
//!
//! ```text
//! raw export file ──> FileStatsRecord (one per file)
//!                          │ grouped by (algorithm, mode, message_size)
//!                          v
//!                     RunSummaryRecord ──┐
//!                                        ├── inner join ──> EnergyRecord
//!                     TimingRecord ──────┘
//!
//!                     MemoryRecord (optional side table)
//! ```

mod energy;
mod file_stats;
mod memory;
mod run_summary;
mod timing;

pub use energy::EnergyRecord;
pub use file_stats::FileStatsRecord;
pub use memory::MemoryRecord;
pub use run_summary::RunSummaryRecord;
pub use timing::TimingRecord;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation mode a measurement file captures.
///
/// Ordering follows the emission sort: encryption, decryption, then the
/// idle baseline capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Encryption measurement (`enc_*.csv`).
    Enc,
    /// Decryption measurement (`dec_*.csv`).
    Dec,
    /// Idle baseline capture (no cryptographic operation running).
    Base,
}

impl Mode {
    /// Lowercase table form: `enc` / `dec` / `base`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enc => "enc",
            Self::Dec => "dec",
            Self::Base => "base",
        }
    }

    /// Uppercase label-suffix form: `ENC` / `DEC` / `BASE`.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Enc => "ENC",
            Self::Dec => "DEC",
            Self::Base => "BASE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_ordering_matches_emission_sort() {
        assert!(Mode::Enc < Mode::Dec);
        assert!(Mode::Dec < Mode::Base);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Enc).unwrap(), "\"enc\"");
    }
}
