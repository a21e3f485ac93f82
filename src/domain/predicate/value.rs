//! Operand values carried by predicate clauses

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operand value that can be various types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// List of values (for membership tests)
    List(Vec<FilterValue>),
    /// Null value
    Null,
}

/// Key rendering: strings lose all whitespace, lists become `[v1,v2]`.
/// Floats always carry a fractional part, so `1.0` and `1` render apart.
impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => {
                for c in s.chars().filter(|c| !c.is_whitespace()) {
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{:?}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(n as i64)
    }
}

impl From<u32> for FilterValue {
    fn from(n: u32) -> Self {
        Self::Integer(n as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(list: Vec<T>) -> Self {
        Self::List(list.into_iter().map(|v| v.into()).collect())
    }
}
