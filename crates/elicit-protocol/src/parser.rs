//! Structured-output extraction and type coercion
//!
//! Generator output is free text expected to contain one JSON object.
//! Extraction finds the first balanced object that parses; the shape
//! shared by questionnaire tasks is a map of 1-based numbered keys, each
//! holding `{"Response": ..., "Reasoning": ...}`. Dialogue tasks use a single
//! `{"utterance": ...}` object.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed, type-coerced response value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// Integer response (numeric task, `int` mode)
    Int(i64),
    /// Floating-point response (numeric task, `float` mode)
    Float(f64),
    /// Textual response (categorical and open tasks)
    Text(String),
}

impl std::fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for ResponseValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Extract the first well-formed JSON object from free text
///
/// Scans for balanced `{...}` candidates (string- and escape-aware) and
/// returns the first that parses as an object. Surrounding prose, code
/// fences, and stray braces inside strings are all tolerated.
///
/// # Errors
/// [`ParseError::NoJson`] when no candidate parses.
pub fn extract_first_json(text: &str) -> Result<Map<String, Value>, ParseError> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(open) = text[start..].find('{').map(|i| start + i) {
        if let Some(end) = balanced_end(bytes, open) {
            if let Ok(Value::Object(map)) = serde_json::from_str(&text[open..=end]) {
                return Ok(map);
            }
        }
        start = open + 1;
    }

    Err(ParseError::NoJson)
}

/// Index of the `}` closing the object opened at `open`, if balanced
fn balanced_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Render a JSON value as plain cell text (strings lose their quotes)
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a response value to `i64`
///
/// Accepts integer JSON numbers and integer-formatted strings. Fractional
/// values, in either form, are a coercion failure.
///
/// # Errors
/// [`ParseError::Coercion`] when the value is not an integer.
pub fn coerce_int(value: &Value) -> Result<i64, ParseError> {
    let fail = || ParseError::Coercion {
        value: value_to_text(value),
        expected: "int",
    };
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(fail),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| fail()),
        _ => Err(fail()),
    }
}

/// Coerce a response value to `f64`
///
/// # Errors
/// [`ParseError::Coercion`] when the value is not numeric.
pub fn coerce_float(value: &Value) -> Result<f64, ParseError> {
    let fail = || ParseError::Coercion {
        value: value_to_text(value),
        expected: "float",
    };
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(fail),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| fail()),
        _ => Err(fail()),
    }
}

/// Pull `count` ordered `(response, reasoning)` pairs from a questionnaire
/// object keyed `"1"..."{count}"`
///
/// Each entry must be an object with a `Response` field; `Reasoning`
/// defaults to empty when absent.
///
/// # Errors
/// Missing entries or `Response` fields.
pub fn questionnaire_entries(
    map: &Map<String, Value>,
    count: usize,
) -> Result<Vec<(Value, String)>, ParseError> {
    let mut entries = Vec::with_capacity(count);
    for index in 1..=count {
        let entry = map
            .get(&index.to_string())
            .and_then(Value::as_object)
            .ok_or(ParseError::MissingEntry { index })?;
        let response = entry
            .get("Response")
            .ok_or(ParseError::MissingField {
                index,
                field: "Response",
            })?
            .clone();
        let reasoning = entry.get("Reasoning").map(value_to_text).unwrap_or_default();
        entries.push((response, reasoning));
    }
    Ok(entries)
}

/// Pull the single utterance from a dialogue response object
///
/// # Errors
/// Missing or non-string `utterance` field.
pub fn extract_utterance(map: &Map<String, Value>) -> Result<String, ParseError> {
    map.get("utterance")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ParseError::MissingField {
            index: 1,
            field: "utterance",
        })
}
