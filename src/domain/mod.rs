//! Domain layer - Key derivation, predicates, store contract and proxy policy

pub mod cache;
pub mod error;
pub mod predicate;
pub mod proxy;

pub use cache::{Cache, CacheExt, CacheKey, KeyArg, KeyBuilder, OperationIdentity};
pub use error::DomainError;
pub use predicate::{
    Clause, CompareOp, CompositeKeying, Connector, FilterValue, Predicate, PredicateDescriptor,
};
pub use proxy::{
    CacheOwner, CachePolicy, ConfigurationResolver, DispatchPolicy, OperationSpec,
    ProxyConfiguration, ResultShape, Strategy, DEFAULT_TTL,
};
