//! End-to-end pipeline test over a scratch measurement tree.
//!
//! Builds the raw-data layout the instrument campaign produces (a
//! baseline capture, per-algorithm folders of `enc_<size>.csv` exports,
//! and a timing dataset), runs the full pipeline, and checks the numbers
//! and the emitted files.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use tempfile::TempDir;

use vatio::config::PipelineConfig;
use vatio::record::Mode;

const KEITHLEY_PREAMBLE: &str = "KEITHLEY INSTRUMENTS,DMM6500\nBuffer,defbuffer1\n";
const KEITHLEY_HEADER: &str = "Reading,Unit,Range Digits,Display Digits,Math,Start Group,\
Limit1 High,Limit1 Low,Limit2 High,Limit2 Low,Terminal,Questionable,Origin,\
Relative Time,Channel,CH Label";

/// Write a Keithley-style export with `n` readings around `amps`.
///
/// Readings alternate +/- `jitter` so the mean stays exactly `amps` for
/// an even `n`.
fn write_export(path: &Path, amps: f64, jitter: f64, n: usize) {
    let mut text = String::from(KEITHLEY_PREAMBLE);
    text.push_str(KEITHLEY_HEADER);
    text.push('\n');
    for i in 0..n {
        let a = if i % 2 == 0 { amps + jitter } else { amps - jitter };
        let t = i as f64 * 0.01;
        text.push_str(&format!(
            "{a:.9},Amps DC,0.1,6.5,F,F,F,F,F,F,F,F,Main,{t:.9},,\n"
        ));
    }
    fs::write(path, text).unwrap();
}

fn build_campaign(root: &Path) {
    let raw = root.join("raw");
    fs::create_dir_all(raw.join("baseline")).unwrap();
    fs::create_dir_all(raw.join("aes128_gcm")).unwrap();

    // Idle draw ~2 mA across 1000 samples
    write_export(&raw.join("baseline/baseline.csv"), 0.002, 0.0001, 1000);
    // Encryption at 128 bytes: 45 mA, single run
    write_export(&raw.join("aes128_gcm/enc_128.csv"), 0.045, 0.001, 500);
    // Decryption at 128 bytes: two independent runs at 44 and 46 mA
    write_export(&raw.join("aes128_gcm/dec_128.csv"), 0.044, 0.001, 500);
    write_export(&raw.join("aes128_gcm/dec_run2_128.csv"), 0.046, 0.001, 400);

    fs::write(
        raw.join("timing_results.csv"),
        "algo,msg_len,reps,avg_us\n\
         AES-GCM-ENC,128,1000,120.0\n\
         AES-GCM-DEC,128,1000,118.0\n\
         AES-GCM-ENC,999,1000,50.0\n",
    )
    .unwrap();

    fs::write(
        raw.join("memory_consumption.csv"),
        ",AES-128-GCM-ENC,AES-128-GCM-DEC\nRAM (bytes),1126,1124\nFlash (bytes),8376,9436\n",
    )
    .unwrap();
}

fn campaign_config(root: &Path) -> PipelineConfig {
    PipelineConfig::builder()
        .voltage_v(9.0)
        .data_raw(root.join("raw"))
        .data_processed(root.join("processed"))
        .build()
        .unwrap()
}

#[test]
fn test_end_to_end_energy_numbers() {
    let dir = TempDir::new().unwrap();
    build_campaign(dir.path());
    let config = campaign_config(dir.path());

    let output = vatio::pipeline::run(&config).unwrap();

    // Baseline: 1000 samples averaging 2 mA
    assert_eq!(output.baseline.sample_count, 1000);
    assert_relative_eq!(output.baseline.mean_ma, 2.0, epsilon = 1e-6);

    // Per-file table: baseline row + three measurement files
    assert_eq!(output.file_stats.len(), 4);

    // Single-run condition: no across-run dispersion
    let enc = output
        .run_summaries
        .iter()
        .find(|s| s.mode == Mode::Enc && s.message_size == 128)
        .unwrap();
    assert_eq!(enc.run_count, 1);
    assert!(enc.across_run_std_ma.is_none());
    assert!(enc.ci95_margin_ma.is_none());
    assert_relative_eq!(enc.delta_ma, 43.0, epsilon = 1e-6);

    // Two-run condition: equal-weight mean of 44 and 46 mA
    let dec = output
        .run_summaries
        .iter()
        .find(|s| s.mode == Mode::Dec && s.message_size == 128)
        .unwrap();
    assert_eq!(dec.run_count, 2);
    assert_relative_eq!(dec.mean_ma, 45.0, epsilon = 1e-6);
    let across = dec.across_run_std_ma.unwrap();
    assert_relative_eq!(across, 2.0f64.sqrt(), epsilon = 1e-6);
    assert_relative_eq!(
        dec.ci95_margin_ma.unwrap(),
        1.96 * across / 2.0f64.sqrt(),
        epsilon = 1e-6
    );

    // Energy: 9 V * 45 mA * 120 us -> 48.6 uJ raw, 46.44 uJ corrected
    assert_eq!(output.energy.len(), 2);
    let enc_energy = output
        .energy
        .iter()
        .find(|e| e.algorithm == "AES128-GCM-ENC")
        .unwrap();
    assert_relative_eq!(enc_energy.raw_energy_uj, 48.6, epsilon = 1e-6);
    assert_relative_eq!(enc_energy.corrected_energy_uj, 46.44, epsilon = 1e-6);
    for e in &output.energy {
        assert_relative_eq!(
            e.raw_energy_uj - e.baseline_energy_uj,
            e.corrected_energy_uj,
            epsilon = 1e-9
        );
    }

    // The timing row at size 999 has no measured condition
    assert_eq!(output.join_report.matched, 2);
    assert_eq!(output.join_report.unmatched_timing.len(), 1);
    assert!(output.join_report.unmatched_timing[0].contains("999"));
    assert!(output.join_report.unmatched_energy.is_empty());

    // Memory side table picked up
    assert_eq!(output.memory.len(), 2);
}

#[test]
fn test_emitted_files_and_schemas() {
    let dir = TempDir::new().unwrap();
    build_campaign(dir.path());
    let config = campaign_config(dir.path());

    vatio::pipeline::run(&config).unwrap();

    let processed = dir.path().join("processed");
    for name in [
        "current_by_file.csv",
        "current_summary.csv",
        "final_energy.csv",
        "memory_results.csv",
        "run_metadata.txt",
        "summary.json",
    ] {
        assert!(processed.join(name).is_file(), "missing {name}");
    }

    let summary = fs::read_to_string(processed.join("current_summary.csv")).unwrap();
    assert!(summary.starts_with(
        "algo,mode,msg_size,I_mean_mA,I_std_within_mA_avg,I_std_across_runs_mA,\
         CI95_across_runs_mA,N_runs,baseline_mean_mA,deltaI_mA\n"
    ));
    // baseline condition + enc + dec
    assert_eq!(summary.lines().count(), 4);

    let energy = fs::read_to_string(processed.join("final_energy.csv")).unwrap();
    assert_eq!(energy.lines().count(), 3);
    assert!(energy.contains("AES128-GCM-ENC,128,1000,120"));
    // DEC sorts before ENC within the same algorithm label
    let dec_line = energy.lines().nth(1).unwrap();
    assert!(dec_line.starts_with("AES128-GCM-DEC,128"));

    let metadata = fs::read_to_string(processed.join("run_metadata.txt")).unwrap();
    assert!(metadata.contains("Baseline samples: 1000"));
    assert!(metadata.contains("unmatched"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(processed.join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(json["join_report"]["matched"], 2);
    assert!(json["baseline"]["mean_ma"].as_f64().unwrap() > 1.9);
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    build_campaign(dir.path());
    let config = campaign_config(dir.path());

    vatio::pipeline::run(&config).unwrap();
    let first = fs::read_to_string(dir.path().join("processed/final_energy.csv")).unwrap();

    vatio::pipeline::run(&config).unwrap();
    let second = fs::read_to_string(dir.path().join("processed/final_energy.csv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_missing_baseline_aborts_run() {
    let dir = TempDir::new().unwrap();
    build_campaign(dir.path());
    fs::remove_file(dir.path().join("raw/baseline/baseline.csv")).unwrap();
    let config = campaign_config(dir.path());

    let err = vatio::pipeline::run(&config).unwrap_err();
    assert!(matches!(err, vatio::Error::MissingBaseline(_)));
}

#[test]
fn test_missing_timing_aborts_run() {
    let dir = TempDir::new().unwrap();
    build_campaign(dir.path());
    fs::remove_file(dir.path().join("raw/timing_results.csv")).unwrap();
    let config = campaign_config(dir.path());

    let err = vatio::pipeline::run(&config).unwrap_err();
    assert!(matches!(err, vatio::Error::Config(_)));
    assert!(err.to_string().contains("timing"));
}

#[test]
fn test_corrupt_file_skipped_and_reported() {
    let dir = TempDir::new().unwrap();
    build_campaign(dir.path());
    // A measurement-shaped file with no usable content
    fs::write(
        dir.path().join("raw/aes128_gcm/enc_256.csv"),
        "garbage with no header\n1,2,3\n",
    )
    .unwrap();
    let config = campaign_config(dir.path());

    let output = vatio::pipeline::run(&config).unwrap();
    assert_eq!(output.skipped.len(), 1);
    assert!(output.skipped[0].0.ends_with("enc_256.csv"));
    // The rest of the batch still processed
    assert_eq!(output.energy.len(), 2);
}
