//! Observability infrastructure - cache proxy metrics

mod metrics;

pub use metrics::{record_cache_lookup, record_store_error, LookupOutcome, StorePhase};
