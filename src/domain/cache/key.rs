//! Cache key derivation for intercepted operations

use std::fmt;

use crate::domain::predicate::{CompositeKeying, Predicate, PredicateDescriptor};

/// Leading segment shared by every key this crate produces
pub const KEY_NAMESPACE: &str = "repo";

/// Separator between positional arguments in a key
pub const ARG_SEPARATOR: &str = "_";

/// Owner type name plus operation name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationIdentity<'a> {
    pub owner: &'a str,
    pub operation: &'a str,
}

impl<'a> OperationIdentity<'a> {
    pub fn new(owner: &'a str, operation: &'a str) -> Self {
        Self { owner, operation }
    }
}

impl fmt::Display for OperationIdentity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.operation)
    }
}

/// One argument of an intercepted call as seen by the key builder
#[derive(Debug, Clone, PartialEq)]
pub enum KeyArg<'a> {
    /// Absent value. Skipped entirely, so `f(None)` and `f()` share a key.
    Null,
    /// Canonical string form of a scalar argument
    Value(String),
    /// Filter description, rendered through [`PredicateDescriptor`]
    Predicate(&'a Predicate),
}

impl KeyArg<'_> {
    pub fn value(value: impl fmt::Display) -> Self {
        KeyArg::Value(value.to_string())
    }
}

impl<'a> KeyArg<'a> {
    pub fn predicate(predicate: &'a Predicate) -> Self {
        KeyArg::Predicate(predicate)
    }
}

impl From<&str> for KeyArg<'_> {
    fn from(value: &str) -> Self {
        KeyArg::Value(value.to_string())
    }
}

impl From<String> for KeyArg<'_> {
    fn from(value: String) -> Self {
        KeyArg::Value(value)
    }
}

impl From<&String> for KeyArg<'_> {
    fn from(value: &String) -> Self {
        KeyArg::Value(value.clone())
    }
}

macro_rules! key_arg_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyArg<'_> {
                fn from(value: $ty) -> Self {
                    KeyArg::Value(value.to_string())
                }
            }
        )*
    };
}

key_arg_from_display!(i32, i64, u32, u64, usize, bool);

impl<'a> From<&'a Predicate> for KeyArg<'a> {
    fn from(predicate: &'a Predicate) -> Self {
        KeyArg::Predicate(predicate)
    }
}

impl<'a, T: Into<KeyArg<'a>>> From<Option<T>> for KeyArg<'a> {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(KeyArg::Null)
    }
}

/// Final lookup string for one call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives deterministic keys of the form `repo:{owner}:{operation}:{...}`.
///
/// Keys are case-sensitive: argument and clause text is kept as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyBuilder {
    keying: CompositeKeying,
}

impl KeyBuilder {
    pub fn new(keying: CompositeKeying) -> Self {
        Self { keying }
    }

    pub fn keying(&self) -> CompositeKeying {
        self.keying
    }

    pub fn build(&self, identity: &OperationIdentity<'_>, args: &[KeyArg<'_>]) -> CacheKey {
        let prefix = format!(
            "{}:{}:{}",
            KEY_NAMESPACE, identity.owner, identity.operation
        );

        if let [KeyArg::Predicate(predicate)] = args {
            let clauses = PredicateDescriptor::from_predicate(predicate, self.keying).render();
            return CacheKey(format!("{}:expr:{}", prefix, clauses));
        }

        let joined = args
            .iter()
            .filter_map(|arg| self.render_arg(arg))
            .collect::<Vec<_>>()
            .join(ARG_SEPARATOR);

        CacheKey(format!("{}:{}", prefix, joined))
    }

    fn render_arg(&self, arg: &KeyArg<'_>) -> Option<String> {
        match arg {
            KeyArg::Null => None,
            KeyArg::Value(value) => Some(value.clone()),
            KeyArg::Predicate(predicate) => {
                Some(PredicateDescriptor::from_predicate(predicate, self.keying).render())
            }
        }
    }
}
