//! Instrument export reader.
//!
//! Parses one raw current-measurement export (Keithley-style delimited
//! text) into a [`SampleTrace`]. The exports are messy by contract:
//! free-form metadata preamble, a `Reading,Unit,...` header line, then one
//! reading per row in amps, with an optional relative-time field near the
//! end of the row. Rows are ragged, delimiters vary between comma,
//! semicolon, and tab, and header lines occasionally repeat mid-file.
//!
//! The reader is tolerant row-by-row but strict file-wide: a file with no
//! header marker or zero plausible samples is a [`Error::Parse`], never an
//! empty trace that downstream statistics would average into zero.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::trace::{Sample, SampleTrace};
use crate::{Error, Result};

/// Plausibility band for a single reading, in amps. Values outside
/// `(1e-6, 1.0)` are header repeats, NaNs, or corrupted rows, not currents
/// this rig can produce.
const CURRENT_MIN_A: f64 = 1e-6;
/// Upper bound of the plausibility band, in amps.
const CURRENT_MAX_A: f64 = 1.0;

/// Delimiters accepted in export files, tried in this order.
const DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Column the relative-time field occupies when the header does not name
/// it (`...,Origin,Relative Time,Channel,CH Label`).
const RELATIVE_TIME_FALLBACK_INDEX: usize = 13;

/// Header tokens accepted as the current column, checked case-insensitively.
const CURRENT_COLUMN_NAMES: [&str; 4] = ["reading", "current", "current (a)", "i"];

/// How the current column was located.
///
/// Resolution order is fixed and deliberate: a named header token wins;
/// otherwise the first field is assumed (the documented export layout);
/// only when both produce zero samples does the reader fall back to
/// scanning each row for the first numeric token inside the plausibility
/// band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnStrategy {
    /// Header named the column at this index.
    Named(usize),
    /// No named match; first field assumed.
    Positional,
    /// Per-row scan for the first plausible numeric token.
    NumericScan,
}

/// Header line location plus everything derived from it.
#[derive(Debug)]
struct HeaderLayout {
    delimiter: char,
    current: ColumnStrategy,
    time_index: usize,
    data_start: usize,
}

/// Read one instrument export into a sample trace (milliamps).
///
/// # Errors
///
/// [`Error::Parse`] when the file has no `Reading,Unit` header marker or
/// yields zero samples inside the plausibility band; [`Error::Io`] when
/// the file cannot be read at all.
pub fn read_trace(path: &Path) -> Result<SampleTrace> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();

    let layout = find_header(&lines).ok_or_else(|| Error::Parse {
        path: path.to_path_buf(),
        reason: "no data header line starting with 'Reading,Unit' found".to_string(),
    })?;

    let mut samples = extract_samples(&lines, &layout);

    // Last-resort fallback: the header was present but the resolved column
    // never parsed. Re-scan each row for the first plausible numeric token.
    if samples.is_empty() && layout.current != ColumnStrategy::NumericScan {
        debug!(
            path = %path.display(),
            "no samples via {:?}, retrying with numeric-token scan",
            layout.current
        );
        let scan_layout = HeaderLayout {
            current: ColumnStrategy::NumericScan,
            ..layout
        };
        samples = extract_samples(&lines, &scan_layout);
    }

    if samples.is_empty() {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            reason: format!(
                "no current samples within the plausible band ({CURRENT_MIN_A:e} A, {CURRENT_MAX_A:e} A)"
            ),
        });
    }

    debug!(
        path = %path.display(),
        samples = samples.len(),
        "read instrument export"
    );
    Ok(SampleTrace::new(samples, path.to_path_buf()))
}

/// Locate the `Reading,Unit` header marker and derive the row layout.
///
/// The delimiter is sniffed from the marker line itself, which makes
/// mixed-delimiter exports (`Reading;Unit;...`) acceptable.
fn find_header(lines: &[&str]) -> Option<HeaderLayout> {
    for (i, line) in lines.iter().enumerate() {
        for delim in DELIMITERS {
            let fields: Vec<&str> = line.split(delim).collect();
            if fields.len() >= 2
                && fields[0].trim().eq_ignore_ascii_case("reading")
                && fields[1].trim().eq_ignore_ascii_case("unit")
            {
                return Some(HeaderLayout {
                    delimiter: delim,
                    current: resolve_current_column(&fields),
                    time_index: resolve_time_column(&fields),
                    data_start: i + 1,
                });
            }
        }
    }
    None
}

/// Named-column match over the header tokens; positional fallback.
fn resolve_current_column(header_fields: &[&str]) -> ColumnStrategy {
    for (idx, field) in header_fields.iter().enumerate() {
        let token = field.trim().to_ascii_lowercase();
        if CURRENT_COLUMN_NAMES.contains(&token.as_str()) {
            return ColumnStrategy::Named(idx);
        }
    }
    ColumnStrategy::Positional
}

/// Named `Relative Time` column, or the documented positional fallback.
fn resolve_time_column(header_fields: &[&str]) -> usize {
    header_fields
        .iter()
        .position(|f| f.trim().eq_ignore_ascii_case("relative time"))
        .unwrap_or(RELATIVE_TIME_FALLBACK_INDEX)
}

/// Walk the data rows, collecting plausible samples and skipping the rest.
fn extract_samples(lines: &[&str], layout: &HeaderLayout) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut skipped = 0usize;

    for line in &lines[layout.data_start..] {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(layout.delimiter).collect();

        let Some(amps) = read_current_a(&fields, layout.current) else {
            skipped += 1;
            continue;
        };

        // Unit column, when present and textual, must look like amps.
        if let Some(unit) = fields.get(1) {
            let unit = unit.trim();
            if !unit.is_empty()
                && unit.parse::<f64>().is_err()
                && !unit.to_ascii_lowercase().contains("amp")
            {
                skipped += 1;
                continue;
            }
        }

        let elapsed_s = fields
            .get(layout.time_index)
            .and_then(|f| f.trim().parse::<f64>().ok())
            .filter(|t| t.is_finite() && *t >= 0.0);

        samples.push(Sample {
            current_ma: amps * 1e3,
            elapsed_s,
        });
    }

    if skipped > 0 {
        debug!(skipped, "rows rejected by plausibility filter");
    }
    samples
}

/// Extract the reading in amps from one row, per the resolved strategy.
fn read_current_a(fields: &[&str], strategy: ColumnStrategy) -> Option<f64> {
    match strategy {
        ColumnStrategy::Named(idx) => parse_plausible(fields.get(idx)?),
        ColumnStrategy::Positional => parse_plausible(fields.first()?),
        ColumnStrategy::NumericScan => fields.iter().find_map(|f| parse_plausible(f)),
    }
}

/// Parse a field as amps, accepting only the plausible band.
fn parse_plausible(field: &str) -> Option<f64> {
    let value: f64 = field.trim().parse().ok()?;
    (value.is_finite() && value.abs() > CURRENT_MIN_A && value.abs() < CURRENT_MAX_A)
        .then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const KEITHLEY_HEADER: &str = "Reading,Unit,Range Digits,Display Digits,Math,Start Group,\
        Limit1 High,Limit1 Low,Limit2 High,Limit2 Low,Terminal,Questionable,Origin,\
        Relative Time,Channel,CH Label";

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_keithley_export_with_preamble() {
        let file = write_file(&format!(
            "KEITHLEY INSTRUMENTS,DMM6500\nBuffer,defbuffer1\n\n{KEITHLEY_HEADER}\n\
             4.5000000E-02,Amps DC,0.1,6.5,F,F,F,F,F,F,F,F,Main,0.000100000,,\n\
             4.4000000E-02,Amps DC,0.1,6.5,F,F,F,F,F,F,F,F,Main,0.000200000,,\n"
        ));

        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.len(), 2);
        assert_relative_eq!(trace.samples()[0].current_ma, 45.0, epsilon = 1e-9);
        assert_relative_eq!(trace.samples()[0].elapsed_s.unwrap(), 1e-4, epsilon = 1e-12);
    }

    #[test]
    fn test_semicolon_delimited_export() {
        let file = write_file(
            "Reading;Unit;Relative Time\n0.002;Amps DC;1.0\n0.003;Amps DC;2.0\n",
        );
        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.len(), 2);
        assert_relative_eq!(trace.samples()[1].current_ma, 3.0, epsilon = 1e-9);
        assert_relative_eq!(trace.samples()[1].elapsed_s.unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ragged_rows_skipped_not_fatal() {
        let file = write_file(
            "Reading,Unit\n0.002,Amps DC\nnot,a,number\n\n0.003,Amps DC\n",
        );
        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn test_header_repeats_rejected_by_band() {
        let file = write_file(
            "Reading,Unit\n0.002,Amps DC\nReading,Unit\n0.003,Amps DC\n",
        );
        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn test_out_of_band_values_rejected() {
        // 5.0 A and 1e-9 A are outside the plausible band
        let file = write_file(
            "Reading,Unit\n5.0,Amps DC\n0.000000001,Amps DC\n0.045,Amps DC\n",
        );
        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.len(), 1);
        assert_relative_eq!(trace.samples()[0].current_ma, 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_amp_unit_rows_rejected() {
        let file = write_file(
            "Reading,Unit\n0.002,Volts DC\n0.045,Amps DC\n",
        );
        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_header_only_file_is_parse_error() {
        let file = write_file("Reading,Unit,Range Digits\n");
        let err = read_trace(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("plausible band"));
    }

    #[test]
    fn test_missing_header_is_parse_error() {
        let file = write_file("0.045\n0.044\n0.046\n");
        let err = read_trace(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("Reading,Unit"));
    }

    #[test]
    fn test_missing_time_field_tolerated() {
        let file = write_file("Reading,Unit\n0.045,Amps DC\n0.044,Amps DC\n");
        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.len(), 2);
        assert!(!trace.has_timestamps());
    }

    #[test]
    fn test_malformed_time_field_tolerated() {
        let file = write_file(&format!(
            "{KEITHLEY_HEADER}\n\
             0.045,Amps DC,0.1,6.5,F,F,F,F,F,F,F,F,Main,garbage,,\n\
             0.044,Amps DC,0.1,6.5,F,F,F,F,F,F,F,F,Main,0.5,,\n"
        ));
        let trace = read_trace(file.path()).unwrap();
        assert_eq!(trace.len(), 2);
        assert!(trace.samples()[0].elapsed_s.is_none());
        assert_relative_eq!(trace.samples()[1].elapsed_s.unwrap(), 0.5, epsilon = 1e-12);
    }
}
