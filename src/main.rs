//! Vatio CLI
//!
//! Batch entry point for the energy measurement pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Full pipeline over data/raw -> data/processed
//! vatio
//!
//! # With the campaign's configuration constants
//! vatio --voltage 5.0 --trim-fraction 0.01
//!
//! # Statistics for one instrument export
//! vatio data/raw/ascon/enc_128.csv
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vatio::config::PipelineConfig;
use vatio::reader::read_trace;
use vatio::stats::summarize;

/// Vatio: energy measurement analytics for embedded crypto benchmarks
#[derive(Parser, Debug)]
#[command(name = "vatio")]
#[command(author = "PAIML")]
#[command(version)]
#[command(
    about = "Turn raw current traces and timing logs into per-operation energy tables"
)]
struct Cli {
    /// Single instrument export to summarize; omit to run the full
    /// pipeline over the configured data directories
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Supply voltage in volts
    #[arg(long, default_value_t = 9.0)]
    voltage: f64,

    /// Trimmed-mean fraction in [0, 0.5) applied to per-file means
    #[arg(long, default_value_t = 0.0)]
    trim_fraction: f64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::builder()
        .voltage_v(cli.voltage)
        .trim_fraction(cli.trim_fraction)
        .build()
        .context("invalid configuration")?;

    match &cli.input {
        Some(path) => summarize_one(path, config.trim_fraction()),
        None => run_pipeline(&config),
    }
}

/// Per-file statistics for a single export, printed to stdout.
fn summarize_one(path: &Path, trim_fraction: f64) -> anyhow::Result<()> {
    let trace = read_trace(path)
        .with_context(|| format!("cannot read instrument export {}", path.display()))?;
    let stats = summarize(&trace.currents_ma(), trim_fraction);

    println!("File:          {}", path.display());
    println!("Samples:       {}", stats.sample_count);
    println!("Mean (mA):     {:.6}", stats.mean_ma);
    println!("Std  (mA):     {:.6}", stats.std_ma);
    if trace.has_timestamps() {
        let samples = trace.samples();
        let last = samples.iter().rev().find_map(|s| s.elapsed_s);
        if let Some(t) = last {
            println!("Capture (s):   {t:.3}");
        }
    }
    Ok(())
}

fn run_pipeline(config: &PipelineConfig) -> anyhow::Result<()> {
    let output = vatio::pipeline::run(config).context("pipeline failed")?;

    println!(
        "Processed {} file(s) into {} condition(s); {} energy row(s) written to {}",
        output.file_stats.len(),
        output.run_summaries.len(),
        output.energy.len(),
        config.data_processed().display()
    );
    if !output.skipped.is_empty() {
        println!("Skipped {} file(s):", output.skipped.len());
        for (path, reason) in &output.skipped {
            println!("  {}: {reason}", path.display());
        }
    }
    if !output.join_report.is_clean() {
        println!("Join diagnostics: {}", output.join_report);
    }
    Ok(())
}
