//! Upstream payload normalization.
//!
//! Pure transforms that reshape heterogeneous workflow JSON into the fixed
//! dashboard schema in [`types`]. Malformed or incomplete payloads come back
//! as `None` so a bad upstream degrades one card, never the whole page.

pub mod comparison;
pub mod labor;
pub mod satisfaction;
pub mod types;

pub use comparison::normalize_comparison;
pub use labor::normalize_labor;
pub use satisfaction::normalize_satisfaction;

use serde_json::Value;

/// Wrapper keys probed, in order, before treating a payload as the record
/// collection itself. Upstream workflows disagree about envelope shape.
const WRAPPER_KEYS: &[&str] = &["data", "results", "items", "records"];

/// Peels one envelope layer off an upstream payload and returns the record
/// collection inside it.
///
/// A bare array passes through; a lone object becomes a one-element
/// collection; scalars and null yield an empty one.
pub fn unwrap_records(raw: &Value) -> Vec<&Value> {
    match raw {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => {
            for key in WRAPPER_KEYS {
                match map.get(*key) {
                    Some(Value::Array(items)) => return items.iter().collect(),
                    Some(inner @ Value::Object(_)) => return vec![inner],
                    _ => {}
                }
            }
            vec![raw]
        }
        _ => Vec::new(),
    }
}

/// Case-insensitive field lookup; upstream sources disagree about casing
/// (`Fiscal_Year` vs `fiscal_year`) and sometimes use spaces in place of
/// underscores.
pub(crate) fn field<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    let map = record.as_object()?;
    map.iter()
        .find(|(key, _)| key_eq(key, name))
        .map(|(_, value)| value)
}

fn key_eq(a: &str, b: &str) -> bool {
    let norm = |c: char| match c {
        ' ' => '_',
        c => c.to_ascii_lowercase(),
    };
    a.len() == b.len() && a.chars().map(norm).eq(b.chars().map(norm))
}

/// Numeric field access. Accepts JSON numbers and numeric strings (the
/// workflows emit both), defaulting to `0.0` when absent or unparseable.
pub(crate) fn num_field(record: &Value, name: &str) -> f64 {
    field(record, name).map(coerce_num).unwrap_or(0.0)
}

/// First present field out of an ordered candidate list, as a number.
pub(crate) fn num_field_any(record: &Value, names: &[&str]) -> f64 {
    names
        .iter()
        .find_map(|name| field(record, name))
        .map(coerce_num)
        .unwrap_or(0.0)
}

fn coerce_num(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// String field access, trimmed; numbers stringify so a numeric fiscal-year
/// column still matches its label.
pub(crate) fn str_field(record: &Value, name: &str) -> Option<String> {
    match field(record, name)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First present field out of an ordered candidate list, as a string.
pub(crate) fn str_field_any(record: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| str_field(record, name))
}

/// Rounds to two decimal places, the precision every percentage on the
/// dashboard is displayed with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
