//! Custom rules referenced by the built-in stage shapes.

use serde_json::Value;

/// Registered name of [`confidence_scale`].
pub const CONFIDENCE_SCALE: &str = "confidence-scale";

/// `confidence` must be a number, or a numeric string with an optional `%`,
/// on either the 0–1 or the 0–100 scale.
pub fn confidence_scale(response: &Value) -> Option<String> {
    let raw = match &response["confidence"] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        Value::Null => return Some("confidence is missing".to_string()),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() && (0.0..=100.0).contains(&v) => None,
        Some(v) => Some(format!("confidence {v} is outside 0-100")),
        None => Some(format!("confidence {} is not numeric", response["confidence"])),
    }
}
