//! Cache proxy metrics, recorded through the `metrics` facade
//!
//! Nothing is exported unless the host process installs a recorder.

use metrics::counter;

/// Result of one cache-aside lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
    Bypass,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Hit => "hit",
            LookupOutcome::Miss => "miss",
            LookupOutcome::Bypass => "bypass",
        }
    }
}

/// Store interaction that failed and was recovered locally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Read,
    Decode,
    Encode,
    Write,
}

impl StorePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorePhase::Read => "read",
            StorePhase::Decode => "decode",
            StorePhase::Encode => "encode",
            StorePhase::Write => "write",
        }
    }
}

/// Record a cache lookup metric
pub fn record_cache_lookup(owner: &str, operation: &str, outcome: LookupOutcome) {
    let labels = [
        ("owner", owner.to_string()),
        ("operation", operation.to_string()),
        ("outcome", outcome.as_str().to_string()),
    ];

    counter!("cache_proxy_lookups_total", &labels).increment(1);
}

/// Record a swallowed store error
pub fn record_store_error(owner: &str, operation: &str, phase: StorePhase) {
    let labels = [
        ("owner", owner.to_string()),
        ("operation", operation.to_string()),
        ("phase", phase.as_str().to_string()),
    ];

    counter!("cache_proxy_store_errors_total", &labels).increment(1);
}
