//! Predicate domain - Structural filter descriptions used for cache key derivation

mod descriptor;
mod expr;
mod value;

pub use descriptor::{Clause, CompositeKeying, PredicateDescriptor, CLAUSE_SEPARATOR};
pub use expr::{CompareOp, Connector, Predicate};
pub use value::FilterValue;
