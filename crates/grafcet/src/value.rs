//! Runtime values of chart variables.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Variable name to value mapping, kept in insertion order.
pub type Variables = IndexMap<String, Value>;

/// A boolean or numeric variable value.
///
/// Serializes untagged, so `true` and `42.5` are both valid in TOML and JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
}

impl Value {
    /// Boolean reading of the value: numbers are true when non-zero.
    pub fn is_truthy(self) -> bool {
        match self {
            Value::Bool(value) => value,
            Value::Number(value) => value != 0.0,
        }
    }

    /// Numeric reading of the value: booleans become `1.0` and `0.0`.
    pub fn as_number(self) -> f64 {
        match self {
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Number(value) => value,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Bool(false)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Number(value) => write!(f, "{value}"),
        }
    }
}
