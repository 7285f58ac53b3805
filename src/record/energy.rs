//! Final Energy Record - reconciled current, timing, and energy figures

use serde::{Deserialize, Serialize};

/// One reconciled row: a measured condition joined with its timing data
/// and converted to energy.
///
/// All three energy figures are retained (raw, baseline, and corrected)
/// so downstream consumers can audit the baseline contribution. A negative
/// corrected energy (baseline exceeding the crypto draw, a measurement
/// artifact) is legal output and is surfaced, never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    /// Normalized algorithm label including mode suffix.
    pub algorithm: String,
    /// Message size in bytes.
    pub message_size: u64,
    /// Repetitions behind the timing average.
    pub repetitions: u64,
    /// Average execution time in microseconds.
    pub average_time_us: f64,
    /// Mean measured current in milliamps (not baseline-corrected).
    pub mean_ma: f64,
    /// Supply voltage in volts.
    pub voltage_v: f64,
    /// Energy the idle baseline would consume over the same interval, in microjoules.
    pub baseline_energy_uj: f64,
    /// Energy at the measured (uncorrected) current, in microjoules.
    pub raw_energy_uj: f64,
    /// `raw_energy_uj - baseline_energy_uj`.
    pub corrected_energy_uj: f64,
    /// Throughput per energy: `message_size * 8 / raw_energy_uj`; `None`
    /// when the message size is zero.
    pub efficiency_bits_per_uj: Option<f64>,
}
