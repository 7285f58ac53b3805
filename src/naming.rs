//! Algorithm name normalization.
//!
//! The energy-side and timing-side datasets label the same primitive
//! differently ("AES-GCM" vs "AES128-GCM-ENC"). Both sides pass through
//! this table before the reconciliation join. Canonical labels are fixed
//! points, so normalization is idempotent.

use crate::record::Mode;

/// Alias table mapping source labels to canonical algorithm labels.
///
/// Lookup is exact on the trimmed base label (mode suffix removed first).
/// Unknown labels pass through unchanged.
const BASE_ALIASES: &[(&str, &str)] = &[
    ("AES-GCM", "AES128-GCM"),
    ("AES-128-GCM", "AES128-GCM"),
    ("AES-256-GCM", "AES256-GCM"),
    ("AES128-GCM", "AES128-GCM"),
    ("AES256-GCM", "AES256-GCM"),
    ("ASCON", "ASCON128"),
    ("ASCON128", "ASCON128"),
    ("ChaChaPoly", "ChaChaPoly"),
    ("ChaCha20-Poly1305", "ChaChaPoly"),
    ("CHACHA", "ChaChaPoly"),
];

/// Normalize a base algorithm label (no mode suffix).
#[must_use]
pub fn normalize_base(label: &str) -> String {
    let trimmed = label.trim();
    for (alias, canonical) in BASE_ALIASES {
        if *alias == trimmed {
            return (*canonical).to_string();
        }
    }
    trimmed.to_string()
}

/// Normalize a full algorithm label, preserving an `-ENC`/`-DEC` suffix.
///
/// `"ASCON-ENC"` becomes `"ASCON128-ENC"`; `"AES-GCM"` (no suffix) becomes
/// `"AES128-GCM"`. Idempotent: canonical labels map to themselves.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    let trimmed = label.trim();
    if let Some(base) = trimmed.strip_suffix("-ENC") {
        return format!("{}-ENC", normalize_base(base));
    }
    if let Some(base) = trimmed.strip_suffix("-DEC") {
        return format!("{}-DEC", normalize_base(base));
    }
    normalize_base(trimmed)
}

/// Split a label into its normalized base and mode suffix, if present.
#[must_use]
pub fn split_mode_suffix(label: &str) -> (String, Option<Mode>) {
    let trimmed = label.trim();
    if let Some(base) = trimmed.strip_suffix("-ENC") {
        return (normalize_base(base), Some(Mode::Enc));
    }
    if let Some(base) = trimmed.strip_suffix("-DEC") {
        return (normalize_base(base), Some(Mode::Dec));
    }
    if let Some(base) = trimmed.strip_suffix("-BASE") {
        return (normalize_base(base), Some(Mode::Base));
    }
    (normalize_base(trimmed), None)
}

/// Build the join label for a condition: canonical base plus mode suffix.
#[must_use]
pub fn join_label(algorithm: &str, mode: Mode) -> String {
    format!("{}-{}", normalize_base(algorithm), mode.suffix())
}
