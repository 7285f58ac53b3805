//! Baseline (idle-current) estimation.
//!
//! The baseline capture records the device's idle draw with no
//! cryptographic operation running. Its mean is the correction term
//! subtracted from every measured condition, so it is computed once per
//! pipeline run and treated as a constant afterwards.

use serde::Serialize;
use std::path::Path;

use tracing::{info, warn};

use crate::reader::read_trace;
use crate::stats::{mean, sample_std};
use crate::{Error, Result};

/// Idle-current statistics, computed once per pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaselineStats {
    /// Mean idle current in milliamps.
    pub mean_ma: f64,
    /// Sample standard deviation in milliamps.
    pub std_ma: f64,
    /// Number of samples behind the estimate.
    pub sample_count: usize,
}

impl BaselineStats {
    /// The explicit zero baseline used by the loud fallback mode.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            mean_ma: 0.0,
            std_ma: 0.0,
            sample_count: 0,
        }
    }
}

/// Estimate baseline statistics from a capture file.
///
/// When a `[start, end]` elapsed-seconds window is given, samples outside
/// it are discarded, which excludes the power-up transient at the head of
/// a capture. A capture without timestamps cannot be windowed; the full
/// trace is used and a warning logged.
///
/// # Errors
///
/// [`Error::Parse`] if the capture parses to zero samples (before or
/// after windowing); IO and header errors as in [`read_trace`].
pub fn estimate(path: &Path, window_s: Option<(f64, f64)>) -> Result<BaselineStats> {
    let trace = read_trace(path)?;

    let trace = match window_s {
        Some((start, end)) if trace.has_timestamps() => {
            let windowed = trace.windowed(start, end);
            if windowed.is_empty() {
                return Err(Error::Parse {
                    path: path.to_path_buf(),
                    reason: format!(
                        "no baseline samples inside the [{start} s, {end} s] window"
                    ),
                });
            }
            windowed
        }
        Some((start, end)) => {
            warn!(
                path = %path.display(),
                "baseline window [{start} s, {end} s] requested but capture has no \
                 timestamps; using all samples"
            );
            trace
        }
        None => trace,
    };

    let currents = trace.currents_ma();
    let stats = BaselineStats {
        mean_ma: mean(&currents),
        std_ma: sample_std(&currents),
        sample_count: currents.len(),
    };
    info!(
        mean_ma = stats.mean_ma,
        std_ma = stats.std_ma,
        samples = stats.sample_count,
        "baseline estimated"
    );
    Ok(stats)
}

/// Estimate the baseline for a pipeline run, honoring the configured
/// missing-file policy.
///
/// A missing capture file is a configuration error (energy figures
/// without a baseline are not meaningful) unless `allow_zero` opts into
/// the degraded mode, which substitutes a zero baseline and says so loudly.
///
/// # Errors
///
/// [`Error::MissingBaseline`] when the file is absent and `allow_zero` is
/// off; otherwise as [`estimate`].
pub fn estimate_or_zero(
    path: &Path,
    window_s: Option<(f64, f64)>,
    allow_zero: bool,
) -> Result<BaselineStats> {
    if path.exists() {
        return estimate(path, window_s);
    }
    if allow_zero {
        warn!(
            path = %path.display(),
            "baseline file not found; proceeding with a 0 mA baseline. \
             Corrected energy will equal raw energy; not recommended."
        );
        return Ok(BaselineStats::zero());
    }
    Err(Error::MissingBaseline(path.to_path_buf()))
}
