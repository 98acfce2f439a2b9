//! Type coercion from raw input to typed values.
//!
//! Raw input arrives either as text (config file, environment, command line)
//! or as an already-typed [`Value`] (defaults, programmatic `set`). Each
//! target type has its own parsing rules:
//!
//! - **string** — identity stringification of any input.
//! - **integer** — base-10 parse of text; native integers pass through.
//! - **boolean** — native booleans pass through; text accepts (case
//!   insensitive) `y`/`yes`/`true`/`1` and `n`/`no`/`false`/`0`. Numeric
//!   input is rejected — booleans only come from booleans or string tokens.
//! - **string-list** — native lists pass through unchanged; text is split on
//!   `,` with each segment trimmed, preserving empty segments.
//! - **string-dict** — native dictionaries pass through; text is parsed as
//!   `{ key : value ; key : value }`, where a value containing `,` becomes a
//!   list of trimmed sub-values.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::value::{DictValue, ParamType, Value};

/// A raw value could not be converted to the target type.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Cannot convert '{value}' to type '{target}'.")]
pub struct CoerceError {
    pub value: String,
    pub target: ParamType,
}

fn fail(raw: &Value, target: ParamType) -> CoerceError {
    CoerceError {
        value: raw.to_string(),
        target,
    }
}

/// Convert `raw` into a value of type `target`, or fail.
pub fn coerce(raw: Value, target: ParamType) -> Result<Value, CoerceError> {
    match target {
        ParamType::Str => Ok(Value::Str(raw.to_string())),
        ParamType::Int => match raw {
            Value::Int(_) => Ok(raw),
            Value::Str(ref s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| fail(&raw, target)),
            _ => Err(fail(&raw, target)),
        },
        ParamType::Bool => match raw {
            Value::Bool(_) => Ok(raw),
            Value::Str(ref s) => bool_from_token(s).map(Value::Bool).ok_or(fail(&raw, target)),
            _ => Err(fail(&raw, target)),
        },
        ParamType::StrList => match raw {
            Value::List(_) => Ok(raw),
            Value::Str(ref s) => Ok(Value::List(split_list(s))),
            _ => Err(fail(&raw, target)),
        },
        ParamType::StrDict => match raw {
            Value::Dict(_) => Ok(raw),
            Value::Str(ref s) => parse_dict(s).map(Value::Dict).ok_or(fail(&raw, target)),
            _ => Err(fail(&raw, target)),
        },
    }
}

/// Translate a boolean-like token. `None` means the token is not recognized.
fn bool_from_token(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Split a comma-delimited string into trimmed segments.
///
/// Empty segments are preserved (`",1,,3,"` has five elements), and anything
/// that is not a comma stays inside its segment, so `"1:3"` is a single
/// element.
fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(|seg| seg.trim().to_string()).collect()
}

/// Parse a brace-delimited dictionary: `{ k1 : v1 ; k2 : v2 }`.
///
/// Entries are separated by `;` (a trailing separator is allowed). A value
/// containing `,` becomes a list of trimmed sub-values; otherwise the value
/// is the trimmed remainder of the entry, internal whitespace intact.
/// Returns `None` on structurally invalid input.
fn parse_dict(s: &str) -> Option<BTreeMap<String, DictValue>> {
    let inner = s.trim().strip_prefix('{')?.strip_suffix('}')?;

    let mut map = BTreeMap::new();
    for entry in inner.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, value) = entry.split_once(':')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let value = value.trim();
        let parsed = if value.contains(',') {
            DictValue::List(value.split(',').map(|v| v.trim().to_string()).collect())
        } else {
            DictValue::Str(value.to_string())
        };
        map.insert(key.to_string(), parsed);
    }
    Some(map)
}
