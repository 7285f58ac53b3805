//! Memory Record - static footprint per algorithm/mode combination

use serde::{Deserialize, Serialize};

use super::Mode;

/// RAM and flash footprint of one firmware build, from the optional
/// memory-consumption side table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Normalized algorithm label.
    pub algorithm: String,
    /// Operation mode the firmware was built for.
    pub mode: Mode,
    /// Static RAM usage in bytes.
    pub ram_bytes: u64,
    /// Flash (program) usage in bytes.
    pub flash_bytes: u64,
}
