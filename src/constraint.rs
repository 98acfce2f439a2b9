//! Enumeration, range, and dictionary-key constraint checks.
//!
//! A value that reached this module has already been coerced to its declared
//! type. When `allowed_values` is present it is the only check performed; a
//! co-declared `allowed_range` is ignored (defined precedence). List values
//! are checked element-wise, and the first violating element is reported.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::value::{DictValue, Value};

/// A coerced value failed an enumeration, range, or key constraint.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstraintError {
    #[error("'{0}' is not one of the allowed values.")]
    NotAllowed(String),
    #[error("'{0}' is not in the allowed range.")]
    OutOfRange(String),
    #[error("Key '{0}' is not one of the allowed keys.")]
    KeyNotAllowed(String),
    #[error("Mandatory key '{0}' is missing.")]
    MissingKey(String),
}

/// Check `value` against the declared enumeration or range.
pub fn check(
    value: &Value,
    allowed_values: Option<&[Value]>,
    allowed_range: Option<&(Value, Value)>,
) -> Result<(), ConstraintError> {
    if let Some(allowed) = allowed_values {
        return check_membership(value, allowed);
    }
    if let Some((min, max)) = allowed_range {
        return check_range(value, min, max);
    }
    Ok(())
}

fn check_membership(value: &Value, allowed: &[Value]) -> Result<(), ConstraintError> {
    match value {
        Value::List(items) => {
            for item in items {
                let elem = Value::Str(item.clone());
                if !allowed.contains(&elem) {
                    return Err(ConstraintError::NotAllowed(item.clone()));
                }
            }
            Ok(())
        }
        other => {
            if allowed.contains(other) {
                Ok(())
            } else {
                Err(ConstraintError::NotAllowed(other.to_string()))
            }
        }
    }
}

fn check_range(value: &Value, min: &Value, max: &Value) -> Result<(), ConstraintError> {
    match value {
        Value::List(items) => {
            for item in items {
                if !in_range(&Value::Str(item.clone()), min, max) {
                    return Err(ConstraintError::OutOfRange(item.clone()));
                }
            }
            Ok(())
        }
        other => {
            if in_range(other, min, max) {
                Ok(())
            } else {
                Err(ConstraintError::OutOfRange(other.to_string()))
            }
        }
    }
}

/// Type-native ordering: numeric for integers, lexicographic for strings.
/// Mismatched variants never satisfy the range.
fn in_range(value: &Value, min: &Value, max: &Value) -> bool {
    match (value, min, max) {
        (Value::Int(v), Value::Int(lo), Value::Int(hi)) => lo <= v && v <= hi,
        (Value::Str(v), Value::Str(lo), Value::Str(hi)) => {
            lo.as_str() <= v.as_str() && v.as_str() <= hi.as_str()
        }
        _ => false,
    }
}

/// Reject any dictionary key outside the allowed set.
pub fn check_keys(
    dict: &BTreeMap<String, DictValue>,
    allowed_keys: Option<&[String]>,
) -> Result<(), ConstraintError> {
    let Some(allowed) = allowed_keys else {
        return Ok(());
    };
    for key in dict.keys() {
        if !allowed.contains(key) {
            return Err(ConstraintError::KeyNotAllowed(key.clone()));
        }
    }
    Ok(())
}

/// Verify every mandatory key is present. Runs once at end-of-merge, not on
/// every assignment.
pub fn check_mandatory(
    dict: &BTreeMap<String, DictValue>,
    mandatory_keys: &[String],
) -> Result<(), ConstraintError> {
    for key in mandatory_keys {
        if !dict.contains_key(key) {
            return Err(ConstraintError::MissingKey(key.clone()));
        }
    }
    Ok(())
}
