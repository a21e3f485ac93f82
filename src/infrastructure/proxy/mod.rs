//! Proxy infrastructure - Cache-aside interception engine

mod caching_proxy;

pub use caching_proxy::{CachingProxy, CachingProxyBuilder};
