//! Sample trace data model.
//!
//! A [`SampleTrace`] is the immutable output of the instrument reader: an
//! ordered sequence of current readings in milliamps, each optionally
//! carrying the instrument's relative timestamp. All downstream statistics
//! consume traces; nothing mutates one after it is read.

use std::path::{Path, PathBuf};

/// One current reading extracted from an instrument export row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Current in milliamps.
    pub current_ma: f64,
    /// Elapsed seconds since capture start, when the export carried one.
    pub elapsed_s: Option<f64>,
}

/// Ordered current samples read from one instrument export file.
///
/// The pipeline-wide unit convention is milliamps; the reader converts
/// from the instrument's amps exactly once, at the trace boundary.
#[derive(Debug, Clone)]
pub struct SampleTrace {
    samples: Vec<Sample>,
    source: PathBuf,
}

impl SampleTrace {
    /// Create a trace from parsed samples.
    pub(crate) fn new(samples: Vec<Sample>, source: PathBuf) -> Self {
        Self { samples, source }
    }

    /// Number of samples in the trace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the trace holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// File the trace was read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// All samples in capture order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Current readings in milliamps, capture order preserved.
    #[must_use]
    pub fn currents_ma(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.current_ma).collect()
    }

    /// Whether any sample carries an instrument timestamp.
    #[must_use]
    pub fn has_timestamps(&self) -> bool {
        self.samples.iter().any(|s| s.elapsed_s.is_some())
    }

    /// Restrict the trace to samples inside `[start_s, end_s]` elapsed time.
    ///
    /// Samples without a timestamp are retained: time filtering is
    /// opportunistic, matching the instrument's habit of dropping the
    /// relative-time field on some rows.
    #[must_use]
    pub fn windowed(&self, start_s: f64, end_s: f64) -> Self {
        let samples = self
            .samples
            .iter()
            .filter(|s| s.elapsed_s.map_or(true, |t| t >= start_s && t <= end_s))
            .copied()
            .collect();
        Self {
            samples,
            source: self.source.clone(),
        }
    }
}
