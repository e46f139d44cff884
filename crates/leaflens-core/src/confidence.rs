//! Confidence normalization.
//!
//! Models report confidence either as a fraction (`0.87`) or a percentage
//! (`87`). Values in `(0, 1]` are fractions; everything else is already a
//! percentage. `0` stays `0`.

use serde_json::Value;

/// Convert a raw confidence to an integer percentage in `0..=100`.
///
/// Apply exactly once, after parsing and before any confidence-based branch.
pub fn normalize_confidence(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    let percent = if raw > 0.0 && raw <= 1.0 {
        raw * 100.0
    } else {
        raw
    };
    percent.round().clamp(0.0, 100.0) as u8
}

/// Read a raw confidence out of a JSON value.
///
/// Accepts numbers and numeric strings with an optional trailing `%`
/// (`"87"`, `"87%"`, `"0.87"`). Returns `None` for anything else.
pub fn raw_confidence(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
}
