//! Pipeline configuration.
//!
//! An explicit value object passed into each pipeline stage at
//! construction time; no process-wide implicit state. Defaults mirror the
//! measurement campaign this tooling was built for (9 V supply, Keithley
//! exports under `data/raw/<algorithm folder>/`, processed tables under
//! `data/processed/`).

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Message sizes (bytes) the measurement protocol sweeps.
pub const DEFAULT_MSG_SIZES: [u64; 6] = [16, 32, 64, 128, 256, 512];

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    voltage_v: f64,
    trim_fraction: f64,
    data_raw: PathBuf,
    data_processed: PathBuf,
    algo_folders: Vec<(String, String)>,
    baseline_file: PathBuf,
    baseline_window_s: Option<(f64, f64)>,
    msg_sizes: Vec<u64>,
    allow_zero_baseline: bool,
}

impl PipelineConfig {
    /// Create a configuration builder with campaign defaults.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Supply voltage in volts.
    #[must_use]
    pub const fn voltage_v(&self) -> f64 {
        self.voltage_v
    }

    /// Trim fraction applied to per-file means.
    #[must_use]
    pub const fn trim_fraction(&self) -> f64 {
        self.trim_fraction
    }

    /// Directory holding raw instrument exports, one folder per algorithm.
    #[must_use]
    pub fn data_raw(&self) -> &Path {
        &self.data_raw
    }

    /// Directory the emitter writes processed tables into.
    #[must_use]
    pub fn data_processed(&self) -> &Path {
        &self.data_processed
    }

    /// Folder-name to algorithm-label mapping, in configured order.
    #[must_use]
    pub fn algo_folders(&self) -> &[(String, String)] {
        &self.algo_folders
    }

    /// Baseline (idle-current) capture file.
    #[must_use]
    pub fn baseline_file(&self) -> &Path {
        &self.baseline_file
    }

    /// Optional `[start, end]` elapsed-seconds window for the baseline,
    /// excluding the power-up transient.
    #[must_use]
    pub const fn baseline_window_s(&self) -> Option<(f64, f64)> {
        self.baseline_window_s
    }

    /// Message sizes the protocol expects; sizes outside this list are
    /// still processed but flagged in the log.
    #[must_use]
    pub fn msg_sizes(&self) -> &[u64] {
        &self.msg_sizes
    }

    /// Whether a missing baseline file degrades to a zero baseline
    /// (loudly) instead of aborting the run.
    #[must_use]
    pub const fn allow_zero_baseline(&self) -> bool {
        self.allow_zero_baseline
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    voltage_v: f64,
    trim_fraction: f64,
    data_raw: PathBuf,
    data_processed: PathBuf,
    algo_folders: Vec<(String, String)>,
    baseline_file: Option<PathBuf>,
    baseline_window_s: Option<(f64, f64)>,
    msg_sizes: Vec<u64>,
    allow_zero_baseline: bool,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self {
            voltage_v: 9.0,
            trim_fraction: 0.0,
            data_raw: PathBuf::from("data/raw"),
            data_processed: PathBuf::from("data/processed"),
            algo_folders: vec![
                ("ascon".to_string(), "ASCON".to_string()),
                ("chacha".to_string(), "ChaCha20-Poly1305".to_string()),
                ("aes128_gcm".to_string(), "AES128-GCM".to_string()),
                ("aes256_gcm".to_string(), "AES256-GCM".to_string()),
            ],
            baseline_file: None,
            baseline_window_s: None,
            msg_sizes: DEFAULT_MSG_SIZES.to_vec(),
            allow_zero_baseline: false,
        }
    }
}

impl PipelineConfigBuilder {
    /// Set the supply voltage in volts.
    #[must_use]
    pub fn voltage_v(mut self, v: f64) -> Self {
        self.voltage_v = v;
        self
    }

    /// Set the trim fraction for per-file means (`[0, 0.5)`).
    #[must_use]
    pub fn trim_fraction(mut self, f: f64) -> Self {
        self.trim_fraction = f;
        self
    }

    /// Set the raw-data directory.
    #[must_use]
    pub fn data_raw(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_raw = dir.into();
        self
    }

    /// Set the processed-data directory.
    #[must_use]
    pub fn data_processed(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_processed = dir.into();
        self
    }

    /// Replace the folder-to-algorithm mapping.
    #[must_use]
    pub fn algo_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.algo_folders = folders
            .into_iter()
            .map(|(f, l)| (f.into(), l.into()))
            .collect();
        self
    }

    /// Set the baseline capture file (default: `<data_raw>/baseline/baseline.csv`).
    #[must_use]
    pub fn baseline_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.baseline_file = Some(path.into());
        self
    }

    /// Window the baseline to `[start, end]` elapsed seconds.
    #[must_use]
    pub fn baseline_window_s(mut self, start: f64, end: f64) -> Self {
        self.baseline_window_s = Some((start, end));
        self
    }

    /// Replace the expected message-size list.
    #[must_use]
    pub fn msg_sizes<I: IntoIterator<Item = u64>>(mut self, sizes: I) -> Self {
        self.msg_sizes = sizes.into_iter().collect();
        self
    }

    /// Permit running without a baseline capture (logged loudly, zero
    /// baseline substituted). Off by default.
    #[must_use]
    pub fn allow_zero_baseline(mut self, allow: bool) -> Self {
        self.allow_zero_baseline = allow;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTrimFraction`] for a trim fraction outside
    /// `[0, 0.5)`, and [`Error::Config`] for a non-positive voltage, an
    /// empty folder map, or an inverted baseline window.
    pub fn build(self) -> Result<PipelineConfig> {
        if !(0.0..0.5).contains(&self.trim_fraction) {
            return Err(Error::InvalidTrimFraction(self.trim_fraction));
        }
        if self.voltage_v <= 0.0 || !self.voltage_v.is_finite() {
            return Err(Error::Config(format!(
                "supply voltage must be positive, got {} V",
                self.voltage_v
            )));
        }
        if self.algo_folders.is_empty() {
            return Err(Error::Config(
                "no algorithm folders configured; nothing to process".to_string(),
            ));
        }
        if let Some((start, end)) = self.baseline_window_s {
            if start >= end {
                return Err(Error::Config(format!(
                    "baseline window start ({start} s) must precede end ({end} s)"
                )));
            }
        }

        let baseline_file = self
            .baseline_file
            .unwrap_or_else(|| self.data_raw.join("baseline").join("baseline.csv"));

        Ok(PipelineConfig {
            voltage_v: self.voltage_v,
            trim_fraction: self.trim_fraction,
            data_raw: self.data_raw,
            data_processed: self.data_processed,
            algo_folders: self.algo_folders,
            baseline_file,
            baseline_window_s: self.baseline_window_s,
            msg_sizes: self.msg_sizes,
            allow_zero_baseline: self.allow_zero_baseline,
        })
    }
}
