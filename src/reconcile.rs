//! Timing/energy reconciliation.
//!
//! Joins the current-side run summaries with the independently-collected
//! timing dataset on `(normalized algorithm, message size)` and converts
//! each matched condition to energy:
//!
//! ```text
//! E_uJ = V * (I_mA / 1000) * (t_us * 1e-6) * 1e6
//! ```
//!
//! The join is inner: conditions present on only one side are dropped
//! from the output and counted in the [`JoinReport`]. Missing timing for
//! one condition must never abort the whole batch.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::baseline::BaselineStats;
use crate::naming::join_label;
use crate::record::{EnergyRecord, Mode, RunSummaryRecord, TimingRecord};

/// Convert a current (mA) over a duration (µs) at a voltage to microjoules.
fn energy_uj(voltage_v: f64, current_ma: f64, time_us: f64) -> f64 {
    voltage_v * (current_ma / 1000.0) * (time_us * 1e-6) * 1e6
}

/// Outcome of the energy/timing join: matched row count plus the
/// condition labels left unmatched on each side.
///
/// A mismatch is a reported diagnostic, never an exception.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    /// Conditions present on both sides.
    pub matched: usize,
    /// Energy-side conditions with no timing row, as `LABEL@size` keys.
    pub unmatched_energy: Vec<String>,
    /// Timing-side rows with no measured condition.
    pub unmatched_timing: Vec<String>,
}

impl JoinReport {
    /// Whether every row on both sides found a partner.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unmatched_energy.is_empty() && self.unmatched_timing.is_empty()
    }
}

impl fmt::Display for JoinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} condition(s) matched, {} energy-side and {} timing-side row(s) unmatched",
            self.matched,
            self.unmatched_energy.len(),
            self.unmatched_timing.len()
        )
    }
}

/// Join run summaries with timing records and compute energy.
///
/// Baseline-mode summaries are skipped; the idle capture has no
/// execution time to reconcile against. Output rows are sorted by
/// `(algorithm, message_size)`; negative corrected energy (baseline
/// exceeding the crypto draw) is surfaced in the log but kept as-is.
#[must_use]
pub fn reconcile(
    summaries: &[RunSummaryRecord],
    timing: &[TimingRecord],
    baseline: &BaselineStats,
    voltage_v: f64,
) -> (Vec<EnergyRecord>, JoinReport) {
    let mut timing_by_key: HashMap<(String, u64), &TimingRecord> = HashMap::new();
    for t in timing {
        // Later duplicates silently shadow earlier ones; timing exports are
        // keyed uniquely in practice.
        timing_by_key.insert((t.algorithm.clone(), t.message_size), t);
    }

    let mut matched_keys: Vec<(String, u64)> = Vec::new();
    let mut records = Vec::new();
    let mut report = JoinReport::default();

    for summary in summaries {
        if summary.mode == Mode::Base {
            continue;
        }
        let label = join_label(&summary.algorithm, summary.mode);
        let key = (label.clone(), summary.message_size);

        let Some(t) = timing_by_key.get(&key) else {
            report
                .unmatched_energy
                .push(format!("{label}@{}", summary.message_size));
            continue;
        };
        matched_keys.push(key);

        let raw = energy_uj(voltage_v, summary.mean_ma, t.average_time_us);
        let base = energy_uj(voltage_v, baseline.mean_ma, t.average_time_us);
        let corrected = raw - base;
        if corrected < 0.0 {
            warn!(
                algorithm = %label,
                message_size = summary.message_size,
                corrected_uj = corrected,
                "corrected energy is negative: baseline draw exceeds the \
                 measured operation; kept as-is (measurement artifact)"
            );
        }

        #[allow(clippy::cast_precision_loss)]
        let efficiency = (summary.message_size > 0 && raw > 0.0)
            .then(|| (summary.message_size * 8) as f64 / raw);

        records.push(EnergyRecord {
            algorithm: label,
            message_size: summary.message_size,
            repetitions: t.repetitions,
            average_time_us: t.average_time_us,
            mean_ma: summary.mean_ma,
            voltage_v,
            baseline_energy_uj: base,
            raw_energy_uj: raw,
            corrected_energy_uj: corrected,
            efficiency_bits_per_uj: efficiency,
        });
    }

    for key in matched_keys {
        timing_by_key.remove(&key);
    }
    report.matched = records.len();
    report.unmatched_timing = timing_by_key
        .keys()
        .map(|(label, size)| format!("{label}@{size}"))
        .collect();
    report.unmatched_energy.sort();
    report.unmatched_timing.sort();

    records.sort_by(|a, b| {
        (a.algorithm.as_str(), a.message_size).cmp(&(b.algorithm.as_str(), b.message_size))
    });

    if report.is_clean() {
        info!(matched = report.matched, "energy/timing join complete");
    } else {
        warn!(
            matched = report.matched,
            unmatched_energy = report.unmatched_energy.len(),
            unmatched_timing = report.unmatched_timing.len(),
            "energy/timing join dropped unmatched conditions: {report}"
        );
    }

    (records, report)
}
