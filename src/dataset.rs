//! Side-dataset loaders: execution timing and memory footprint.
//!
//! Both datasets arrive as small tabular files collected independently of
//! the current measurements. The timing table is required for energy
//! reconciliation and is validated against a fixed set of logical columns;
//! the memory table is optional and arrives transposed (two labeled rows,
//! one column per algorithm/mode combination).

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::naming::{normalize_label, split_mode_suffix};
use crate::record::{MemoryRecord, TimingRecord};
use crate::{Error, Result};

/// Accepted header labels per logical timing column.
///
/// Matching is case-insensitive on the trimmed header token. The first
/// logical name is the canonical one reported in errors.
const TIMING_COLUMNS: [(&str, &[&str]); 4] = [
    ("algo", &["algo", "algorithm"]),
    ("msg_len", &["msg_len", "message_size", "msg_size"]),
    ("reps", &["reps", "repetitions"]),
    (
        "avg_us",
        &[
            "avg_us",
            "average_time_us",
            "avg_time_us",
            "average_time_microseconds",
        ],
    ),
];

/// Pick the delimiter that splits a header line into the most fields.
fn sniff_delimiter(header: &str) -> char {
    [',', ';', '\t']
        .into_iter()
        .max_by_key(|d| header.split(*d).count())
        .unwrap_or(',')
}

/// Load the timing dataset.
///
/// Algorithm labels are normalized; rows whose label carries no
/// `-ENC`/`-DEC` suffix are duplicated into both modes when no row in the
/// file carries one. A timing source without mode granularity must still
/// join against per-mode current data.
///
/// # Errors
///
/// [`Error::MissingColumns`] listing each absent logical column;
/// [`Error::Parse`] when the file is empty or no data row survives.
pub fn load_timing(path: &Path) -> Result<Vec<TimingRecord>> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or_else(|| Error::Parse {
        path: path.to_path_buf(),
        reason: "timing dataset is empty".to_string(),
    })?;
    let delim = sniff_delimiter(header);
    let header_fields: Vec<String> = header
        .split(delim)
        .map(|f| f.trim().to_ascii_lowercase())
        .collect();

    let mut indices = [0usize; 4];
    let mut missing = Vec::new();
    for (slot, (canonical, aliases)) in TIMING_COLUMNS.iter().enumerate() {
        match header_fields
            .iter()
            .position(|h| aliases.contains(&h.as_str()))
        {
            Some(idx) => indices[slot] = idx,
            None => missing.push((*canonical).to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(Error::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }
    let [algo_idx, size_idx, reps_idx, time_idx] = indices;

    let mut raw_rows: Vec<(String, u64, u64, f64)> = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(delim).collect();
        let parsed = (|| {
            let algo = fields.get(algo_idx)?.trim().to_string();
            let size: u64 = fields.get(size_idx)?.trim().parse().ok()?;
            let reps: u64 = fields.get(reps_idx)?.trim().parse().ok()?;
            let avg_us: f64 = fields.get(time_idx)?.trim().parse().ok()?;
            Some((algo, size, reps, avg_us))
        })();
        match parsed {
            Some(row) => raw_rows.push(row),
            None => warn!(
                path = %path.display(),
                line = line_no + 2,
                "skipping malformed timing row"
            ),
        }
    }
    if raw_rows.is_empty() {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            reason: "no usable timing rows".to_string(),
        });
    }

    // A source with any per-mode labels is treated as mode-aware; one
    // without is duplicated into ENC and DEC candidates.
    let has_mode = raw_rows
        .iter()
        .any(|(algo, ..)| algo.ends_with("-ENC") || algo.ends_with("-DEC"));

    let mut records = Vec::new();
    for (algo, size, reps, avg_us) in raw_rows {
        if has_mode {
            records.push(TimingRecord {
                algorithm: normalize_label(&algo),
                message_size: size,
                repetitions: reps,
                average_time_us: avg_us,
            });
        } else {
            for suffix in ["ENC", "DEC"] {
                records.push(TimingRecord {
                    algorithm: format!("{}-{suffix}", normalize_label(&algo)),
                    message_size: size,
                    repetitions: reps,
                    average_time_us: avg_us,
                });
            }
        }
    }

    info!(
        path = %path.display(),
        rows = records.len(),
        mode_aware = has_mode,
        "timing dataset loaded"
    );
    Ok(records)
}

/// Load the optional memory-footprint side table.
///
/// Expected shape (transposed):
///
/// ```csv
/// ,ASCON-ENC,ASCON-DEC,AES128-GCM-ENC,...
/// RAM (bytes),848,860,1126,...
/// Flash (bytes),8182,10180,8376,...
/// ```
///
/// Columns whose label carries no mode suffix are skipped.
///
/// # Errors
///
/// [`Error::Parse`] when the `RAM`/`Flash` rows are absent or a cell
/// fails to parse as an integer.
pub fn load_memory(path: &Path) -> Result<Vec<MemoryRecord>> {
    let text = fs::read_to_string(path)?;
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    let header = lines.first().ok_or_else(|| Error::Parse {
        path: path.to_path_buf(),
        reason: "memory table is empty".to_string(),
    })?;
    let delim = sniff_delimiter(header);
    let labels: Vec<&str> = header.split(delim).map(str::trim).collect();

    let find_row = |prefix: &str| -> Option<Vec<&str>> {
        lines[1..].iter().find_map(|line| {
            let fields: Vec<&str> = line.split(delim).map(str::trim).collect();
            fields
                .first()
                .is_some_and(|f| f.to_ascii_lowercase().starts_with(prefix))
                .then_some(fields)
        })
    };

    let ram_row = find_row("ram");
    let flash_row = find_row("flash");
    let (Some(ram_row), Some(flash_row)) = (ram_row, flash_row) else {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            reason: "expected 'RAM (bytes)' and 'Flash (bytes)' rows".to_string(),
        });
    };

    let mut records = Vec::new();
    for (col, label) in labels.iter().enumerate().skip(1) {
        if label.is_empty() {
            continue;
        }
        let (algorithm, Some(mode)) = split_mode_suffix(label) else {
            debug!(column = %label, "memory column without mode suffix skipped");
            continue;
        };
        let parse_cell = |row: &[&str], what: &str| -> Result<u64> {
            row.get(col)
                .and_then(|c| c.parse::<u64>().ok())
                .ok_or_else(|| Error::Parse {
                    path: path.to_path_buf(),
                    reason: format!("bad {what} value for column '{label}'"),
                })
        };
        records.push(MemoryRecord {
            algorithm,
            mode,
            ram_bytes: parse_cell(&ram_row, "RAM")?,
            flash_bytes: parse_cell(&flash_row, "Flash")?,
        });
    }

    info!(
        path = %path.display(),
        rows = records.len(),
        "memory table loaded"
    );
    Ok(records)
}
