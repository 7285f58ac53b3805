//! # Vatio: Energy Measurement Analytics for Embedded Crypto Benchmarks
//!
//! Vatio turns raw current traces (Keithley-style instrument exports) and
//! operation-timing logs captured from a microcontroller running AEAD
//! primitives into per-operation energy estimates with statistical
//! confidence bounds, suitable for cross-algorithm comparison.
//!
//! ## Pipeline
//!
//! ```text
//! instrument exports ──> reader ──> per-file stats ──> run aggregator ──┐
//!                                                   (baseline applied)  │
//! timing dataset ──────> loader ──> name normalization ────────────────┼──> reconciler ──> emitter
//! ```
//!
//! Each stage consumes immutable inputs and produces a new immutable
//! table; re-running the pipeline is a pure function of the raw files.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vatio::config::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .voltage_v(9.0)
//!     .trim_fraction(0.01)
//!     .data_raw("data/raw")
//!     .data_processed("data/processed")
//!     .build()?;
//!
//! let output = vatio::pipeline::run(&config)?;
//! println!(
//!     "{} conditions, {} energy rows, {} file(s) skipped",
//!     output.run_summaries.len(),
//!     output.energy.len(),
//!     output.skipped.len()
//! );
//! # Ok::<(), vatio::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod baseline;
pub mod config;
pub mod dataset;
pub mod emit;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod reader;
pub mod reconcile;
pub mod record;
pub mod stats;
pub mod trace;

pub use baseline::BaselineStats;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{Error, Result};
pub use pipeline::PipelineOutput;
pub use reconcile::JoinReport;
pub use record::{
    EnergyRecord, FileStatsRecord, MemoryRecord, Mode, RunSummaryRecord, TimingRecord,
};
pub use stats::SampleStats;
pub use trace::{Sample, SampleTrace};
