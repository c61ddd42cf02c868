//! Lenient numeric ingestion shared by manual input, extraction payloads and
//! backend responses.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses free text into a finite number.
///
/// The first `,` is read as a decimal separator so `"1,5"` yields `1.5`.
/// Surrounding whitespace is ignored and blank text is `0`. Anything that
/// does not parse to a finite number is `0`.
pub fn normalize_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let normalized = trimmed.replacen(',', ".", 1);
    match normalized.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => parsed,
        _ => 0.0,
    }
}

/// Normalizes a JSON value of unknown shape. Numbers pass through when
/// finite, strings go through [`normalize_str`], everything else is `0`.
pub fn normalize_value(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number
            .as_f64()
            .filter(|parsed| parsed.is_finite())
            .unwrap_or(0.0),
        Value::String(text) => normalize_str(text),
        _ => 0.0,
    }
}

pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.is_finite() {
        // Avoid handing out negative zero.
        rounded + 0.0
    } else {
        0.0
    }
}

/// `deserialize_with` helper for decimal fields that may arrive as JSON
/// numbers, numeric strings or `null`.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(normalize_value).unwrap_or(0.0))
}

/// Like [`deserialize_lenient`] but keeps `null`/missing as `None`.
pub fn deserialize_lenient_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => Some(normalize_value(&value)),
    })
}
