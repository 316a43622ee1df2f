//! Lenient field coercion for collected records.
//!
//! Raw content arrives from loosely typed sources (JSON dumps, SQLite columns
//! with dynamic typing). Values that cannot be converted become `None` and are
//! defaulted further down the pipeline; nothing here returns an error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Truncates toward zero; values outside the `i64` range are absent.
fn float_to_i64(value: f64) -> Option<i64> {
    let value = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parses an integer, accepting decimal text by truncating toward zero.
pub fn parse_i64(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(float_to_i64))
}

/// Parses a finite float.
pub fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a boolean flag written as text or as a number.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        other => parse_f64(other).map(|v| v != 0.0),
    }
}

fn value_to_i64(value: Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_i64)),
        Value::String(s) => parse_i64(&s),
        Value::Bool(b) => Some(i64::from(b)),
        _ => None,
    }
}

fn value_to_f64(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_f64(&s),
        _ => None,
    }
}

fn value_to_flag(value: Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => parse_flag(&s),
        _ => None,
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_i64))
}

pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_f64))
}

pub fn lenient_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_flag))
}

pub fn lenient_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_text))
}
