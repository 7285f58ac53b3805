//! Summary emission.
//!
//! Serializes each produced table to the processed-data directory in a
//! stable, documented schema, sorted by `(algorithm, mode, message_size)`
//! for reproducible diffs. Destinations are created as needed and every
//! write logs its row count; tables are never replaced silently.
//!
//! ## Emitted files
//!
//! | File                  | Schema                                                                 |
//! |-----------------------|------------------------------------------------------------------------|
//! | `current_by_file.csv` | `algo,mode,msg_size,file,I_mean_mA,I_std_mA,N_samples`                 |
//! | `current_summary.csv` | `algo,mode,msg_size,I_mean_mA,I_std_within_mA_avg,I_std_across_runs_mA,CI95_across_runs_mA,N_runs,baseline_mean_mA,deltaI_mA` |
//! | `final_energy.csv`    | `algo,msg_len,reps,avg_us,avg_current_mA,voltage_V,baseline_energy_uJ,energy_uJ,energy_corrected_uJ,efficiency_bits_per_uJ` |
//! | `memory_results.csv`  | `algo,mode,ram_bytes,flash_bytes`                                      |
//! | `run_metadata.txt`    | baseline statistics + across-run-CI applicability caveat               |
//! | `summary.json`        | all of the above as one JSON document                                  |
//!
//! Empty cells stand for values that are undefined (for example the
//! across-run dispersion of a single-run condition), never for zero.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::baseline::BaselineStats;
use crate::reconcile::JoinReport;
use crate::record::{EnergyRecord, FileStatsRecord, MemoryRecord, RunSummaryRecord};
use crate::Result;

/// Writes pipeline tables to one processed-data directory.
#[derive(Debug)]
pub struct SummaryEmitter {
    out_dir: PathBuf,
}

/// Everything the JSON summary bundles together.
#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    generated_utc: String,
    baseline: &'a BaselineStats,
    file_stats: &'a [FileStatsRecord],
    run_summaries: &'a [RunSummaryRecord],
    energy: &'a [EnergyRecord],
    memory: &'a [MemoryRecord],
    join_report: &'a JoinReport,
}

/// Format an optional float as a CSV cell; `None` stays empty.
fn opt_cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

impl SummaryEmitter {
    /// Create an emitter targeting `out_dir`, creating it if absent.
    ///
    /// # Errors
    ///
    /// IO errors from directory creation.
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)?;
        Ok(Self { out_dir })
    }

    /// Directory the tables land in.
    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn open(&self, name: &str) -> Result<(BufWriter<File>, PathBuf)> {
        let path = self.out_dir.join(name);
        let file = File::create(&path)?;
        Ok((BufWriter::new(file), path))
    }

    /// Write the per-file statistics table.
    ///
    /// # Errors
    ///
    /// IO errors from file creation or writing.
    pub fn write_file_stats(&self, records: &[FileStatsRecord]) -> Result<PathBuf> {
        let mut rows: Vec<&FileStatsRecord> = records.iter().collect();
        rows.sort_by(|a, b| {
            (&a.algorithm, a.mode, a.message_size, &a.source)
                .cmp(&(&b.algorithm, b.mode, b.message_size, &b.source))
        });

        let (mut w, path) = self.open("current_by_file.csv")?;
        writeln!(w, "algo,mode,msg_size,file,I_mean_mA,I_std_mA,N_samples")?;
        for r in &rows {
            writeln!(
                w,
                "{},{},{},{},{},{},{}",
                r.algorithm,
                r.mode,
                r.message_size,
                r.source.display(),
                r.mean_ma,
                r.std_ma,
                r.sample_count
            )?;
        }
        w.flush()?;
        info!(rows = rows.len(), path = %path.display(), "wrote per-file statistics");
        Ok(path)
    }

    /// Write the run-summary table.
    ///
    /// # Errors
    ///
    /// IO errors from file creation or writing.
    pub fn write_run_summaries(&self, records: &[RunSummaryRecord]) -> Result<PathBuf> {
        let mut rows: Vec<&RunSummaryRecord> = records.iter().collect();
        rows.sort_by(|a, b| {
            (&a.algorithm, a.mode, a.message_size).cmp(&(&b.algorithm, b.mode, b.message_size))
        });

        let (mut w, path) = self.open("current_summary.csv")?;
        writeln!(
            w,
            "algo,mode,msg_size,I_mean_mA,I_std_within_mA_avg,I_std_across_runs_mA,\
             CI95_across_runs_mA,N_runs,baseline_mean_mA,deltaI_mA"
        )?;
        for r in &rows {
            writeln!(
                w,
                "{},{},{},{},{},{},{},{},{},{}",
                r.algorithm,
                r.mode,
                r.message_size,
                r.mean_ma,
                r.within_std_avg_ma,
                opt_cell(r.across_run_std_ma),
                opt_cell(r.ci95_margin_ma),
                r.run_count,
                r.baseline_mean_ma,
                r.delta_ma
            )?;
        }
        w.flush()?;
        info!(rows = rows.len(), path = %path.display(), "wrote run summaries");
        Ok(path)
    }

    /// Write the final energy table.
    ///
    /// # Errors
    ///
    /// IO errors from file creation or writing.
    pub fn write_energy(&self, records: &[EnergyRecord]) -> Result<PathBuf> {
        let mut rows: Vec<&EnergyRecord> = records.iter().collect();
        rows.sort_by(|a, b| {
            (&a.algorithm, a.message_size).cmp(&(&b.algorithm, b.message_size))
        });

        let (mut w, path) = self.open("final_energy.csv")?;
        writeln!(
            w,
            "algo,msg_len,reps,avg_us,avg_current_mA,voltage_V,baseline_energy_uJ,\
             energy_uJ,energy_corrected_uJ,efficiency_bits_per_uJ"
        )?;
        for r in &rows {
            writeln!(
                w,
                "{},{},{},{},{},{},{},{},{},{}",
                r.algorithm,
                r.message_size,
                r.repetitions,
                r.average_time_us,
                r.mean_ma,
                r.voltage_v,
                r.baseline_energy_uj,
                r.raw_energy_uj,
                r.corrected_energy_uj,
                opt_cell(r.efficiency_bits_per_uj)
            )?;
        }
        w.flush()?;
        info!(rows = rows.len(), path = %path.display(), "wrote energy table");
        Ok(path)
    }

    /// Write the memory-footprint table.
    ///
    /// # Errors
    ///
    /// IO errors from file creation or writing.
    pub fn write_memory(&self, records: &[MemoryRecord]) -> Result<PathBuf> {
        let mut rows: Vec<&MemoryRecord> = records.iter().collect();
        rows.sort_by(|a, b| (&a.algorithm, a.mode).cmp(&(&b.algorithm, b.mode)));

        let (mut w, path) = self.open("memory_results.csv")?;
        writeln!(w, "algo,mode,ram_bytes,flash_bytes")?;
        for r in &rows {
            writeln!(
                w,
                "{},{},{},{}",
                r.algorithm, r.mode, r.ram_bytes, r.flash_bytes
            )?;
        }
        w.flush()?;
        info!(rows = rows.len(), path = %path.display(), "wrote memory table");
        Ok(path)
    }

    /// Write the plain-text run-metadata note.
    ///
    /// # Errors
    ///
    /// IO errors from file creation or writing.
    pub fn write_metadata(
        &self,
        baseline: &BaselineStats,
        baseline_source: &Path,
        join_report: &JoinReport,
    ) -> Result<PathBuf> {
        let (mut w, path) = self.open("run_metadata.txt")?;
        writeln!(w, "Power/current processing metadata")?;
        writeln!(w, "Generated: {}", Utc::now().to_rfc3339())?;
        writeln!(w)?;
        writeln!(w, "Baseline file: {}", baseline_source.display())?;
        writeln!(w, "Baseline mean (mA): {:.6}", baseline.mean_ma)?;
        writeln!(w, "Baseline std  (mA): {:.6}", baseline.std_ma)?;
        writeln!(w, "Baseline samples: {}", baseline.sample_count)?;
        writeln!(w)?;
        writeln!(w, "Join: {join_report}")?;
        if !join_report.unmatched_energy.is_empty() {
            writeln!(
                w,
                "Unmatched energy-side: {}",
                join_report.unmatched_energy.join(", ")
            )?;
        }
        if !join_report.unmatched_timing.is_empty() {
            writeln!(
                w,
                "Unmatched timing-side: {}",
                join_report.unmatched_timing.join(", ")
            )?;
        }
        writeln!(w)?;
        writeln!(
            w,
            "Note: the across-run CI is computed only when multiple files exist \
             per (algo, mode, size)."
        )?;
        writeln!(
            w,
            "If only one file exists, the CI column is left blank (not zero)."
        )?;
        w.flush()?;
        info!(path = %path.display(), "wrote run metadata note");
        Ok(path)
    }

    /// Write the JSON bundle of all tables.
    ///
    /// # Errors
    ///
    /// IO errors and JSON serialization failures.
    #[allow(clippy::too_many_arguments)]
    pub fn write_json(
        &self,
        baseline: &BaselineStats,
        file_stats: &[FileStatsRecord],
        run_summaries: &[RunSummaryRecord],
        energy: &[EnergyRecord],
        memory: &[MemoryRecord],
        join_report: &JoinReport,
    ) -> Result<PathBuf> {
        let summary = JsonSummary {
            generated_utc: Utc::now().to_rfc3339(),
            baseline,
            file_stats,
            run_summaries,
            energy,
            memory,
            join_report,
        };
        let path = self.out_dir.join("summary.json");
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)?;
        info!(path = %path.display(), "wrote JSON summary");
        Ok(path)
    }
}
