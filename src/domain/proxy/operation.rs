//! Operation declarations for wrapped capability sets

use std::fmt;

use crate::domain::DomainError;

/// Identity of a wrapped implementation, used as the owner key segment.
///
/// Renaming the owner moves the type to a fresh key space.
pub trait CacheOwner {
    const OWNER: &'static str;
}

/// What an operation hands back to its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    /// Deferred completion without a value. Never cached.
    Completion,
    /// Deferred single value, cached through the suspending store API
    Deferred,
    /// Value produced without suspension, cached through the blocking store API
    Immediate,
}

impl fmt::Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completion => write!(f, "completion"),
            Self::Deferred => write!(f, "deferred"),
            Self::Immediate => write!(f, "immediate"),
        }
    }
}

/// One operation of a capability set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationSpec {
    pub name: &'static str,
    pub shape: ResultShape,
}

impl OperationSpec {
    pub const fn completion(name: &'static str) -> Self {
        Self {
            name,
            shape: ResultShape::Completion,
        }
    }

    pub const fn deferred(name: &'static str) -> Self {
        Self {
            name,
            shape: ResultShape::Deferred,
        }
    }

    pub const fn immediate(name: &'static str) -> Self {
        Self {
            name,
            shape: ResultShape::Immediate,
        }
    }
}

/// Checks that a name can be used as a key segment
pub fn validate_key_segment(kind: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::configuration(format!("{} name is empty", kind)));
    }

    if value.contains(':') || value.chars().any(char::is_whitespace) {
        return Err(DomainError::configuration(format!(
            "{} name '{}' must not contain ':' or whitespace",
            kind, value
        )));
    }

    Ok(())
}
