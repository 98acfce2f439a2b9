//! Dynamically typed parameter values.
//!
//! A parameter's value can be a string, integer, boolean, string list, or
//! string-keyed dictionary. [`Value`] is the tagged variant holding any of
//! these; [`ParamType`] is the closed enumeration a declaration picks from.
//! Coercion between raw input and a typed `Value` lives in
//! [`coerce`](crate::coerce).

use std::collections::BTreeMap;
use std::fmt;

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Int,
    Bool,
    StrList,
    StrDict,
}

impl ParamType {
    /// The type that individual elements are checked against.
    ///
    /// Lists carry string elements, so constraints on a list parameter are
    /// declared and checked as strings. Scalar types are their own element
    /// type.
    pub(crate) fn element_type(self) -> ParamType {
        match self {
            ParamType::StrList => ParamType::Str,
            other => other,
        }
    }

    /// Whether this type consumes a value on the command line.
    /// Booleans are bare flags.
    pub(crate) fn takes_cmd_value(self) -> bool {
        self != ParamType::Bool
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Str => "string",
            ParamType::Int => "integer",
            ParamType::Bool => "boolean",
            ParamType::StrList => "string-list",
            ParamType::StrDict => "string-dict",
        };
        f.write_str(name)
    }
}

/// A resolved parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
    Dict(BTreeMap<String, DictValue>),
}

/// One entry in a dictionary-typed value: a bare string, or a list when the
/// raw text contained comma-separated sub-values.
#[derive(Debug, Clone, PartialEq)]
pub enum DictValue {
    Str(String),
    List(Vec<String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, DictValue>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => f.write_str(&items.join(",")),
            Value::Dict(map) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect();
                write!(f, "{{ {} }}", entries.join("; "))
            }
        }
    }
}

impl fmt::Display for DictValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictValue::Str(s) => f.write_str(s),
            DictValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<BTreeMap<String, DictValue>> for Value {
    fn from(map: BTreeMap<String, DictValue>) -> Self {
        Value::Dict(map)
    }
}

impl From<&str> for DictValue {
    fn from(s: &str) -> Self {
        DictValue::Str(s.to_string())
    }
}

impl From<Vec<&str>> for DictValue {
    fn from(items: Vec<&str>) -> Self {
        DictValue::List(items.into_iter().map(str::to_string).collect())
    }
}
