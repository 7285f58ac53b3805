//! Run Summary Record - one condition aggregated across repeated runs

use serde::{Deserialize, Serialize};

use super::Mode;

/// Aggregated current statistics for one `(algorithm, mode, message_size)`
/// condition across its repeated measurement files.
///
/// `across_run_std_ma` and `ci95_margin_ma` exist only when at least two
/// runs were measured. A single run carries no across-run dispersion
/// information, so both stay `None`: an empty cell in the emitted table,
/// never a fabricated zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummaryRecord {
    /// Algorithm label.
    pub algorithm: String,
    /// Operation mode.
    pub mode: Mode,
    /// Message size in bytes.
    pub message_size: u64,
    /// Mean of the per-file mean currents, each file weighted equally.
    pub mean_ma: f64,
    /// Mean of the per-file (within-run) standard deviations.
    pub within_std_avg_ma: f64,
    /// Sample standard deviation of the per-file means; `None` below two runs.
    pub across_run_std_ma: Option<f64>,
    /// `1.96 * across_run_std / sqrt(run_count)`; `None` below two runs.
    pub ci95_margin_ma: Option<f64>,
    /// Number of measurement files aggregated.
    pub run_count: usize,
    /// Baseline (idle) mean current in milliamps, echoed for auditability.
    pub baseline_mean_ma: f64,
    /// Net current attributable to the operation: mean minus baseline.
    pub delta_ma: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_none_fields_round_trip() {
        let rec = RunSummaryRecord {
            algorithm: "ASCON".to_string(),
            mode: Mode::Enc,
            message_size: 16,
            mean_ma: 45.0,
            within_std_avg_ma: 0.4,
            across_run_std_ma: None,
            ci95_margin_ma: None,
            run_count: 1,
            baseline_mean_ma: 2.0,
            delta_ma: 43.0,
        };
        let json = serde_json::to_string(&rec).unwrap();
        let back: RunSummaryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
        assert!(back.across_run_std_ma.is_none());
    }
}
