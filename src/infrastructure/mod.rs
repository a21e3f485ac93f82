//! Infrastructure layer - Store adapters, the proxy engine, logging and metrics

pub mod cache;
pub mod logging;
pub mod observability;
pub mod proxy;
