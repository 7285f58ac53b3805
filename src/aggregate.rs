//! Run aggregation: per-file statistics to per-condition summaries.
//!
//! Repeated measurement files for the same `(algorithm, mode, message
//! size)` condition are independent runs. Aggregation averages the
//! per-file means with equal weight: a file with 10 samples counts as
//! much as one with 10,000. That is a deliberate simplification carried
//! over from the measurement protocol, not an oversight; per-file sample
//! counts are retained in the by-file table for anyone who wants to
//! reweight.
//!
//! Across-run dispersion and the 95% confidence margin use the
//! large-sample normal approximation (z = 1.96) even at two runs, again
//! matching the protocol. Both are `None` for a single run: one file
//! carries no across-run information and must not be displayed as
//! perfectly precise.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::baseline::BaselineStats;
use crate::record::{FileStatsRecord, Mode, RunSummaryRecord};
use crate::stats::{mean, sample_std};

/// z-score for the 95% confidence margin (normal approximation).
const CONFIDENCE_Z_95: f64 = 1.96;

/// Aggregate per-file records into one summary per condition.
///
/// Output is sorted by `(algorithm, mode, message_size)`.
#[must_use]
pub fn summarize_runs(
    files: &[FileStatsRecord],
    baseline: &BaselineStats,
) -> Vec<RunSummaryRecord> {
    let mut groups: BTreeMap<(String, Mode, u64), Vec<&FileStatsRecord>> = BTreeMap::new();
    for record in files {
        groups.entry(record.condition()).or_default().push(record);
    }

    let mut summaries = Vec::with_capacity(groups.len());
    for ((algorithm, mode, message_size), group) in groups {
        let means: Vec<f64> = group.iter().map(|r| r.mean_ma).collect();
        let stds: Vec<f64> = group.iter().map(|r| r.std_ma).collect();
        let run_count = group.len();

        let mean_ma = mean(&means);
        let (across_run_std_ma, ci95_margin_ma) = if run_count >= 2 {
            let across = sample_std(&means);
            #[allow(clippy::cast_precision_loss)]
            let margin = CONFIDENCE_Z_95 * across / (run_count as f64).sqrt();
            if across == 0.0 {
                warn!(
                    %algorithm,
                    %mode,
                    message_size,
                    run_count,
                    "zero across-run variance; identical per-file means are \
                     suspicious for independent runs"
                );
            }
            (Some(across), Some(margin))
        } else {
            debug!(
                %algorithm,
                %mode,
                message_size,
                "single run; across-run dispersion and CI left empty"
            );
            (None, None)
        };

        summaries.push(RunSummaryRecord {
            algorithm,
            mode,
            message_size,
            mean_ma,
            within_std_avg_ma: mean(&stds),
            across_run_std_ma,
            ci95_margin_ma,
            run_count,
            baseline_mean_ma: baseline.mean_ma,
            delta_ma: mean_ma - baseline.mean_ma,
        });
    }
    summaries
}
