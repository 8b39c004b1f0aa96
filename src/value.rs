//! Fallible coercions over untyped JSON values.
//!
//! Columnar observation files are permissive: any field may hold
//! numbers, numeric strings, nested arrays or nulls. Every coercion
//! below returns [Option] so each failure path stays visible at the
//! call site, where it usually degrades to a blanked field.
use serde_json::Value;

/// Coerces to floating point. JSON numbers and numeric
/// strings are both accepted, anything else is rejected.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerces to an integer, rounding to nearest.
/// Used on PRN / validity indicators, which some receivers
/// emit as floating point.
pub fn as_i64(value: &Value) -> Option<i64> {
    as_f64(value).map(|f| f.round() as i64)
}

/// Coerces to an array slice
pub fn as_slice(value: &Value) -> Option<&[Value]> {
    value.as_array().map(|v| v.as_slice())
}
