//! Pipeline orchestration.
//!
//! Single-threaded, batch-oriented, and idempotent: one invocation walks
//! a snapshot of the raw-data tree, reduces every measurement file,
//! aggregates, reconciles against timing, and emits the processed tables.
//! Re-running is a pure function of the raw inputs.
//!
//! File-level failures are isolated: a file that cannot be parsed is
//! skipped and reported, and the rest of the batch proceeds. Dataset-level
//! failures (missing baseline capture, missing timing columns) abort the
//! run; energy figures without them are not meaningful.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::baseline::{self, BaselineStats};
use crate::config::PipelineConfig;
use crate::dataset;
use crate::emit::SummaryEmitter;
use crate::reader::read_trace;
use crate::reconcile::{self, JoinReport};
use crate::record::{EnergyRecord, FileStatsRecord, MemoryRecord, Mode, RunSummaryRecord};
use crate::stats::summarize;
use crate::{aggregate, Error, Result};

/// Label used for the baseline capture's row in the per-file table.
const BASELINE_LABEL: &str = "BASELINE";

/// File name of the required timing dataset inside the raw-data directory.
const TIMING_FILE: &str = "timing_results.csv";

/// File name of the optional memory side table inside the raw-data directory.
const MEMORY_FILE: &str = "memory_consumption.csv";

/// Everything one pipeline run produces.
#[derive(Debug, Serialize)]
pub struct PipelineOutput {
    /// Baseline statistics used for correction.
    pub baseline: BaselineStats,
    /// Per-file statistics, including the baseline capture's own row.
    pub file_stats: Vec<FileStatsRecord>,
    /// One summary per measured condition.
    pub run_summaries: Vec<RunSummaryRecord>,
    /// Reconciled energy table.
    pub energy: Vec<EnergyRecord>,
    /// Memory footprint rows (empty when the side table is absent).
    pub memory: Vec<MemoryRecord>,
    /// Join diagnostics from reconciliation.
    pub join_report: JoinReport,
    /// Files skipped with the reason, for the run report.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Parse a measurement filename into its mode and message size.
///
/// The campaign's naming contract: an `enc_`/`dec_` prefix picks the mode
/// and the trailing `_<size>.csv` digits pick the message size
/// (case-insensitive). Repeated runs of one condition carry extra middle
/// segments (`enc_run2_128.csv`). Anything else (summaries, timing
/// exports, stray files) is not a measurement and returns `None`.
fn parse_condition_filename(name: &str) -> Option<(Mode, u64)> {
    let lower = name.to_ascii_lowercase();
    let stem = lower.strip_suffix(".csv")?;
    let mode = if stem.starts_with("enc_") {
        Mode::Enc
    } else if stem.starts_with("dec_") {
        Mode::Dec
    } else {
        return None;
    };
    let size: u64 = stem.rsplit('_').next()?.parse().ok()?;
    Some((mode, size))
}

/// Snapshot the `.csv` files of one algorithm folder, sorted by name.
fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Run the full pipeline: read, reduce, aggregate, reconcile, emit.
///
/// # Errors
///
/// [`Error::MissingBaseline`] / [`Error::MissingColumns`] /
/// [`Error::Config`] for dataset-level problems; IO errors from the
/// emitter. Per-file parse failures do not error; they are collected in
/// [`PipelineOutput::skipped`].
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let output = process(config)?;

    let emitter = SummaryEmitter::new(config.data_processed())?;
    emitter.write_file_stats(&output.file_stats)?;
    emitter.write_run_summaries(&output.run_summaries)?;
    emitter.write_energy(&output.energy)?;
    if !output.memory.is_empty() {
        emitter.write_memory(&output.memory)?;
    }
    emitter.write_metadata(
        &output.baseline,
        config.baseline_file(),
        &output.join_report,
    )?;
    emitter.write_json(
        &output.baseline,
        &output.file_stats,
        &output.run_summaries,
        &output.energy,
        &output.memory,
        &output.join_report,
    )?;

    Ok(output)
}

/// Run the pipeline without emitting: everything up to the in-memory tables.
///
/// # Errors
///
/// As [`run`], minus the emitter IO.
pub fn process(config: &PipelineConfig) -> Result<PipelineOutput> {
    let baseline = baseline::estimate_or_zero(
        config.baseline_file(),
        config.baseline_window_s(),
        config.allow_zero_baseline(),
    )?;

    let mut file_stats = Vec::new();
    let mut skipped: Vec<(PathBuf, String)> = Vec::new();

    // The baseline capture gets its own per-file row for auditability.
    if baseline.sample_count > 0 {
        file_stats.push(FileStatsRecord {
            algorithm: BASELINE_LABEL.to_string(),
            mode: Mode::Base,
            message_size: 0,
            source: config.baseline_file().to_path_buf(),
            mean_ma: baseline.mean_ma,
            std_ma: baseline.std_ma,
            sample_count: baseline.sample_count,
        });
    }

    for (folder, algo_label) in config.algo_folders() {
        let dir = config.data_raw().join(folder);
        if !dir.is_dir() {
            info!(folder = %dir.display(), "algorithm folder absent; skipping");
            continue;
        }

        for path in list_csv_files(&dir)? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some((mode, message_size)) = parse_condition_filename(&name) else {
                debug!(file = %path.display(), "not a measurement filename; ignored");
                continue;
            };
            if !config.msg_sizes().contains(&message_size) {
                debug!(
                    file = %path.display(),
                    message_size,
                    "size outside the configured protocol sweep"
                );
            }

            match read_trace(&path) {
                Ok(trace) => {
                    let stats = summarize(&trace.currents_ma(), config.trim_fraction());
                    file_stats.push(FileStatsRecord::new(
                        algo_label.clone(),
                        mode,
                        message_size,
                        path,
                        stats,
                    ));
                }
                Err(err) => {
                    warn!(file = %path.display(), %err, "skipping unreadable measurement file");
                    skipped.push((path, err.to_string()));
                }
            }
        }
    }

    if file_stats.iter().all(|r| r.mode == Mode::Base) {
        return Err(Error::Config(format!(
            "no measurement files found under {}; expected enc_<size>.csv / dec_<size>.csv \
             in the configured algorithm folders",
            config.data_raw().display()
        )));
    }

    let run_summaries = aggregate::summarize_runs(&file_stats, &baseline);

    let timing_path = config.data_raw().join(TIMING_FILE);
    if !timing_path.is_file() {
        return Err(Error::Config(format!(
            "timing dataset not found at {}; energy cannot be computed without it",
            timing_path.display()
        )));
    }
    let timing = dataset::load_timing(&timing_path)?;

    let (energy, join_report) =
        reconcile::reconcile(&run_summaries, &timing, &baseline, config.voltage_v());

    let memory_path = config.data_raw().join(MEMORY_FILE);
    let memory = if memory_path.is_file() {
        dataset::load_memory(&memory_path)?
    } else {
        info!(path = %memory_path.display(), "memory side table absent; skipping");
        Vec::new()
    };

    for (path, reason) in &skipped {
        warn!(file = %path.display(), %reason, "file skipped this run");
    }
    info!(
        files = file_stats.len(),
        conditions = run_summaries.len(),
        energy_rows = energy.len(),
        skipped = skipped.len(),
        "pipeline complete"
    );

    Ok(PipelineOutput {
        baseline,
        file_stats,
        run_summaries,
        energy,
        memory,
        join_report,
        skipped,
    })
}
