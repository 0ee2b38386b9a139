//! Field-level coercion for loosely typed admin payloads.
//!
//! Upstream panels send capability flags and numeric settings as JSON
//! booleans, numbers, or strings interchangeably ("true", "1", 1, true).
//! Each function here is total over `serde_json::Value` and its edge
//! behavior is fixed below — no implicit runtime coercion anywhere else.

use serde_json::Value;

/// Truthiness coercion for capability flags.
///
/// `null`, `false`, `0`, and `""` coerce to false; every other value,
/// including the string `"false"`, coerces to true. This deliberately
/// mirrors the loose semantics the admin panel has always relied on.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Integer coercion for id/status fields.
///
/// Accepts JSON integers, whole-valued floats, and decimal strings
/// (trimmed). Partial-numeric strings ("12abc"), empty strings, `null`,
/// booleans, and containers are rejected with `None` — callers decide
/// which error that maps to.
pub fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// Numeric coercion for reference-data fields.
///
/// Accepts JSON numbers, decimal strings (trimmed), and booleans
/// (1.0/0.0). Empty strings, non-numeric strings, `null`, and containers
/// are rejected with `None`. No range check — negative and out-of-range
/// values pass through unchanged.
pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
