//! Per-operation invocation strategy, classified once per proxy

use std::collections::HashMap;

use crate::domain::DomainError;

use super::operation::{validate_key_segment, OperationSpec, ResultShape};

/// How an intercepted call is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Invoke the target and return; the store is never touched
    Bypass,
    /// Cache-aside through the suspending store API
    CacheAside,
    /// Cache-aside through the blocking store API
    CacheAsideBlocking,
}

impl From<ResultShape> for Strategy {
    fn from(shape: ResultShape) -> Self {
        match shape {
            ResultShape::Completion => Strategy::Bypass,
            ResultShape::Deferred => Strategy::CacheAside,
            ResultShape::Immediate => Strategy::CacheAsideBlocking,
        }
    }
}

impl Strategy {
    pub fn is_cached(&self) -> bool {
        !matches!(self, Strategy::Bypass)
    }
}

/// Strategy table for one capability set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPolicy {
    strategies: HashMap<&'static str, Strategy>,
}

impl DispatchPolicy {
    /// Classifies every declared operation.
    ///
    /// An empty set, a duplicate name, or a name unusable as a key segment
    /// means the declaration is not a valid capability set.
    pub fn classify(operations: &[OperationSpec]) -> Result<Self, DomainError> {
        if operations.is_empty() {
            return Err(DomainError::configuration(
                "Capability set declares no operations",
            ));
        }

        let mut strategies = HashMap::with_capacity(operations.len());

        for spec in operations {
            validate_key_segment("Operation", spec.name)?;

            if strategies.insert(spec.name, Strategy::from(spec.shape)).is_some() {
                return Err(DomainError::configuration(format!(
                    "Operation '{}' is declared more than once",
                    spec.name
                )));
            }
        }

        Ok(Self { strategies })
    }

    pub fn strategy(&self, operation: &str) -> Option<Strategy> {
        self.strategies.get(operation).copied()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
