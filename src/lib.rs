//! Repository cache proxy
//!
//! Transparent cache-aside decorator for repository-style capability sets:
//! - Deterministic keys from owner, operation and arguments
//! - Explicit filter predicates rendered into stable key segments
//! - Per-owner TTL policy resolved once at construction
//! - Redis and in-memory stores behind one `Cache` contract

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    Cache, CacheExt, CacheKey, CacheOwner, CachePolicy, CompositeKeying, DomainError, KeyArg,
    KeyBuilder, OperationSpec, Predicate,
};
pub use infrastructure::cache::{CacheConfig, CacheFactory, InMemoryCache, RedisCache};
pub use infrastructure::proxy::{CachingProxy, CachingProxyBuilder};
