//! Explicit filter predicates passed to cached operations

use std::fmt;
use std::ops::Not;

use serde::{Deserialize, Serialize};

use super::value::FilterValue;

/// Comparison operators for field tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "Equal"),
            Self::NotEqual => write!(f, "NotEqual"),
            Self::GreaterThan => write!(f, "GreaterThan"),
            Self::GreaterThanOrEqual => write!(f, "GreaterThanOrEqual"),
            Self::LessThan => write!(f, "LessThan"),
            Self::LessThanOrEqual => write!(f, "LessThanOrEqual"),
        }
    }
}

/// Logical connectors for combining predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connector {
    /// Logical AND
    #[default]
    And,
    /// Logical OR
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "And"),
            Self::Or => write!(f, "Or"),
        }
    }
}

/// Structural description of a filter condition.
///
/// Callers build one of these instead of handing over an opaque closure, so
/// the cache layer can derive a stable key without executing the filter.
///
/// ```
/// use repo_cache_proxy::domain::predicate::Predicate;
///
/// let lisbon_adults = Predicate::eq("City", "Lisbon").and(Predicate::gte("Age", 18i64));
/// let not_porto = !Predicate::eq("City", "Porto");
/// # let _ = (lisbon_adults, not_porto);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Constant outcome, e.g. "match everything"
    Literal(bool),
    /// `field <op> value`
    Compare {
        field: String,
        op: CompareOp,
        value: FilterValue,
    },
    /// Named test invoked on a field, e.g. `Name.StartsWith("A")`
    Call {
        field: String,
        method: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argument: Option<FilterValue>,
    },
    /// Field value is one of `values`
    In {
        field: String,
        values: Vec<FilterValue>,
    },
    /// Logical negation of the inner predicate
    Not(Box<Predicate>),
    /// AND/OR group
    Composite {
        connector: Connector,
        operands: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn always() -> Self {
        Self::Literal(true)
    }

    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<FilterValue>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, CompareOp::Equal, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, CompareOp::NotEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, CompareOp::GreaterThan, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, CompareOp::GreaterThanOrEqual, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, CompareOp::LessThan, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, CompareOp::LessThanOrEqual, value)
    }

    /// Method-style test on a field, e.g. `call("City", "Equals", "Lisbon")`
    pub fn call(
        field: impl Into<String>,
        method: impl Into<String>,
        argument: impl Into<FilterValue>,
    ) -> Self {
        Self::Call {
            field: field.into(),
            method: method.into(),
            argument: Some(argument.into()),
        }
    }

    pub fn in_list<V: Into<FilterValue>>(field: impl Into<String>, values: Vec<V>) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// AND group over all operands
    pub fn all(operands: Vec<Predicate>) -> Self {
        Self::Composite {
            connector: Connector::And,
            operands,
        }
    }

    /// OR group over all operands
    pub fn any(operands: Vec<Predicate>) -> Self {
        Self::Composite {
            connector: Connector::Or,
            operands,
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Self::all(vec![self, other])
    }

    pub fn or(self, other: Predicate) -> Self {
        Self::any(vec![self, other])
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        Predicate::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_builders() {
        let p = Predicate::eq("City", "Lisbon");
        assert_eq!(
            p,
            Predicate::Compare {
                field: "City".to_string(),
                op: CompareOp::Equal,
                value: FilterValue::String("Lisbon".to_string()),
            }
        );

        assert!(matches!(
            Predicate::lte("Age", 30i64),
            Predicate::Compare {
                op: CompareOp::LessThanOrEqual,
                ..
            }
        ));
    }

    #[test]
    fn test_and_or_build_binary_groups() {
        let p = Predicate::eq("City", "Lisbon").or(Predicate::eq("City", "Porto"));

        if let Predicate::Composite {
            connector,
            operands,
        } = p
        {
            assert_eq!(connector, Connector::Or);
            assert_eq!(operands.len(), 2);
        } else {
            panic!("Expected a composite predicate");
        }
    }

    #[test]
    fn test_not_operator_wraps() {
        let p = !Predicate::eq("City", "Porto");
        assert!(matches!(p, Predicate::Not(_)));
    }

    #[test]
    fn test_predicate_deserialization() {
        let json = r#"{
            "composite": {
                "connector": "and",
                "operands": [
                    {"compare": {"field": "City", "op": "equal", "value": "Lisbon"}},
                    {"in": {"field": "Id", "values": [1, 2, 3]}},
                    {"not": {"call": {"field": "Name", "method": "StartsWith", "argument": "A"}}}
                ]
            }
        }"#;

        let parsed: Predicate = serde_json::from_str(json).unwrap();
        let expected = Predicate::all(vec![
            Predicate::eq("City", "Lisbon"),
            Predicate::in_list("Id", vec![1i64, 2, 3]),
            !Predicate::call("Name", "StartsWith", "A"),
        ]);

        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(CompareOp::Equal.to_string(), "Equal");
        assert_eq!(CompareOp::GreaterThanOrEqual.to_string(), "GreaterThanOrEqual");
        assert_eq!(Connector::Or.to_string(), "Or");
    }
}
