//! Flattening predicates into ordered clause lists for cache keys

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::expr::{CompareOp, Connector, Predicate};
use super::value::FilterValue;

/// Separator between rendered clauses
pub const CLAUSE_SEPARATOR: &str = ":";

/// How AND/OR groups contribute to the rendered descriptor.
///
/// Changing this on a live deployment changes every predicate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKeying {
    /// Connectives are dropped and duplicate clauses collapse.
    /// `A && B` and `A || B` render identically.
    Flatten,
    /// Every group emits `{Connector}:{arity}` ahead of its operands and
    /// duplicates are kept, so distinct trees never share a rendering.
    #[default]
    Preserve,
}

impl fmt::Display for CompositeKeying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flatten => write!(f, "flatten"),
            Self::Preserve => write!(f, "preserve"),
        }
    }
}

impl std::str::FromStr for CompositeKeying {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flatten" => Ok(Self::Flatten),
            "preserve" => Ok(Self::Preserve),
            _ => Err(format!(
                "Unknown composite keying: {}. Valid values: flatten, preserve",
                s
            )),
        }
    }
}

/// One atomic test extracted from a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Literal(bool),
    Compare {
        field: String,
        op: CompareOp,
        value: String,
    },
    Call {
        field: String,
        method: String,
        value: String,
    },
    Membership {
        field: String,
        values: String,
    },
    Negation,
    Connective {
        connector: Connector,
        arity: usize,
    },
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(b) => write!(f, "{}", b),
            Self::Compare { field, op, value } => write!(f, "{}:{}:{}", field, op, value),
            Self::Call {
                field,
                method,
                value,
            } => write!(f, "{}:{}:{}", field, method, value),
            Self::Membership { field, values } => write!(f, "{}:In:{}", field, values),
            Self::Negation => write!(f, "Unary:Not"),
            Self::Connective { connector, arity } => write!(f, "{}:{}", connector, arity),
        }
    }
}

/// Ordered clause list derived from a [`Predicate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateDescriptor {
    clauses: Vec<Clause>,
    keying: CompositeKeying,
}

impl PredicateDescriptor {
    /// Walks the predicate in pre-order and records its clauses
    pub fn from_predicate(predicate: &Predicate, keying: CompositeKeying) -> Self {
        let mut descriptor = Self {
            clauses: Vec::new(),
            keying,
        };
        descriptor.visit(predicate);
        descriptor
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn keying(&self) -> CompositeKeying {
        self.keying
    }

    /// Renders the clauses joined by [`CLAUSE_SEPARATOR`], whitespace removed
    pub fn render(&self) -> String {
        let rendered = self.clauses.iter().map(|clause| {
            clause
                .to_string()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
        });

        let parts: Vec<String> = match self.keying {
            CompositeKeying::Flatten => {
                let mut seen = HashSet::new();
                rendered.filter(|part| seen.insert(part.clone())).collect()
            }
            // Connective arities count operands, so dropping a repeat would
            // shift the prefix grouping and make the rendering ambiguous
            CompositeKeying::Preserve => rendered.collect(),
        };

        parts.join(CLAUSE_SEPARATOR)
    }

    fn visit(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::Literal(value) => self.clauses.push(Clause::Literal(*value)),
            Predicate::Compare { field, op, value } => self.clauses.push(Clause::Compare {
                field: field.clone(),
                op: *op,
                value: value.to_string(),
            }),
            Predicate::Call {
                field,
                method,
                argument,
            } => self.clauses.push(Clause::Call {
                field: field.clone(),
                method: method.clone(),
                value: argument
                    .as_ref()
                    .map(FilterValue::to_string)
                    .unwrap_or_default(),
            }),
            Predicate::In { field, values } => self.clauses.push(Clause::Membership {
                field: field.clone(),
                values: FilterValue::List(values.clone()).to_string(),
            }),
            Predicate::Not(inner) => {
                self.clauses.push(Clause::Negation);
                self.visit(inner);
            }
            Predicate::Composite {
                connector,
                operands,
            } => {
                if self.keying == CompositeKeying::Preserve {
                    self.clauses.push(Clause::Connective {
                        connector: *connector,
                        arity: operands.len(),
                    });
                }

                for operand in operands {
                    self.visit(operand);
                }
            }
        }
    }
}

impl fmt::Display for PredicateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
