//! Per-file sample statistics.
//!
//! Reduces one sample sequence to mean, sample standard deviation, and
//! count. The optional trimmed mean discards a fixed fraction of extreme
//! values from each tail before averaging, for robustness against
//! measurement spikes.

use serde::Serialize;

/// Summary statistics for one sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleStats {
    /// Mean current in milliamps (trimmed when a trim fraction is set).
    pub mean_ma: f64,
    /// Sample (Bessel-corrected) standard deviation of the full sequence.
    pub std_ma: f64,
    /// Number of samples in the full sequence.
    pub sample_count: usize,
}

/// Arithmetic mean. Zero for an empty slice; callers feed reader output,
/// which is guaranteed non-empty.
#[must_use]
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = xs.len() as f64;
    xs.iter().sum::<f64>() / n
}

/// Sample standard deviation with Bessel's correction.
///
/// Defined as zero when fewer than two samples exist: a single reading
/// carries no dispersion information.
#[must_use]
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    #[allow(clippy::cast_precision_loss)]
    let denom = (xs.len() - 1) as f64;
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / denom).sqrt()
}

/// Trimmed mean: discard the lowest and highest `floor(frac * N)` samples
/// before averaging.
///
/// A fraction of zero (or less) is a no-op equivalent to the plain mean.
/// Over-trimming (`2k >= N`) falls back to the untrimmed mean rather than
/// averaging an empty slice.
#[must_use]
pub fn trimmed_mean(xs: &[f64], frac: f64) -> f64 {
    if frac <= 0.0 {
        return mean(xs);
    }
    let n = xs.len();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let k = (n as f64 * frac) as usize;
    if 2 * k >= n {
        return mean(xs);
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    mean(&sorted[k..n - k])
}

/// Reduce a sample sequence to [`SampleStats`].
///
/// The mean honors `trim_fraction`; the standard deviation and count always
/// cover the full, untrimmed sequence.
#[must_use]
pub fn summarize(xs: &[f64], trim_fraction: f64) -> SampleStats {
    SampleStats {
        mean_ma: trimmed_mean(xs, trim_fraction),
        std_ma: sample_std(xs),
        sample_count: xs.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_basic() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sample_std_bessel() {
        // Known value: std of [2, 4, 4, 4, 5, 5, 7, 9] with ddof=1
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sample_std(&xs), 2.138_089_935, epsilon = 1e-9);
    }

    #[test]
    fn test_sample_std_single_sample_is_zero() {
        assert_eq!(sample_std(&[42.0]), 0.0);
    }

    #[test]
    fn test_trimmed_mean_zero_fraction_equals_mean() {
        let xs = [5.0, 1.0, 9.0, 3.0];
        assert_eq!(trimmed_mean(&xs, 0.0), mean(&xs));
    }

    #[test]
    fn test_trimmed_mean_discards_tails() {
        // k = floor(5 * 0.2) = 1: drop 100.0 and 0.0
        let xs = [100.0, 2.0, 3.0, 4.0, 0.0];
        assert_relative_eq!(trimmed_mean(&xs, 0.2), 3.0);
    }

    #[test]
    fn test_trimmed_mean_overtrim_falls_back() {
        // k = floor(2 * 0.49) = 0 -> no trim; k = floor(3 * 0.4) = 1, 2k < 3 fine;
        // force 2k >= n with n = 2, frac = 0.5 is out of config range but the
        // function itself must still guard.
        let xs = [1.0, 3.0];
        assert_relative_eq!(trimmed_mean(&xs, 0.5), 2.0);
    }

    #[test]
    fn test_summarize_counts_full_sequence() {
        let xs = [100.0, 2.0, 3.0, 4.0, 0.0];
        let stats = summarize(&xs, 0.2);
        assert_eq!(stats.sample_count, 5);
        assert_relative_eq!(stats.mean_ma, 3.0);
        // std covers the untrimmed sequence
        assert_relative_eq!(stats.std_ma, sample_std(&xs));
    }

    // Property-based tests (EXTREME TDD - Toyota Way: Jidoka)
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: trim fraction 0 is exactly the plain mean
            #[test]
            fn prop_trim_zero_is_plain_mean(
                xs in prop::collection::vec(0.0f64..100.0, 1..500)
            ) {
                prop_assert_eq!(trimmed_mean(&xs, 0.0), mean(&xs));
            }

            /// Property: the trimmed mean is invariant to input order
            #[test]
            fn prop_trimmed_mean_order_independent(
                xs in prop::collection::vec(0.0f64..100.0, 3..500),
                frac in 0.01f64..0.49,
            ) {
                let mut reversed = xs.clone();
                reversed.reverse();
                let mut sorted = xs.clone();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

                let k = (xs.len() as f64 * frac) as usize;
                prop_assume!(2 * k < xs.len());

                prop_assert_eq!(trimmed_mean(&xs, frac), trimmed_mean(&reversed, frac));
                prop_assert_eq!(trimmed_mean(&xs, frac), trimmed_mean(&sorted, frac));
            }

            /// Property: trimmed mean stays within the sample range
            #[test]
            fn prop_trimmed_mean_bounded(
                xs in prop::collection::vec(0.0f64..100.0, 1..500),
                frac in 0.0f64..0.49,
            ) {
                let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let tm = trimmed_mean(&xs, frac);
                prop_assert!(tm >= lo - 1e-9 && tm <= hi + 1e-9);
            }

            /// Property: sample std is non-negative and zero for n < 2
            #[test]
            fn prop_sample_std_nonnegative(
                xs in prop::collection::vec(-100.0f64..100.0, 0..200)
            ) {
                let s = sample_std(&xs);
                prop_assert!(s >= 0.0);
                if xs.len() < 2 {
                    prop_assert_eq!(s, 0.0);
                }
            }
        }
    }
}
