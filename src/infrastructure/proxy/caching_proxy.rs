//! Cache-aside interception for wrapped capability sets

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::cache::{
    decode_value, encode_value, Cache, CacheKey, KeyArg, OperationIdentity,
};
use crate::domain::proxy::{
    CacheOwner, CachePolicy, ConfigurationResolver, OperationSpec, ProxyConfiguration, Strategy,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_cache_lookup, record_store_error, LookupOutcome, StorePhase,
};

/// Builder for [`CachingProxy`]
pub struct CachingProxyBuilder<T> {
    operations: Vec<OperationSpec>,
    target: Option<T>,
    store: Option<Arc<dyn Cache>>,
    policy: CachePolicy,
}

impl<T: CacheOwner> CachingProxyBuilder<T> {
    /// Starts a builder for a capability set declaring `operations`
    pub fn new(operations: &[OperationSpec]) -> Self {
        Self {
            operations: operations.to_vec(),
            target: None,
            store: None,
            policy: CachePolicy::default(),
        }
    }

    /// Sets the real implementation
    pub fn target(mut self, target: T) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the shared store handle
    pub fn store(mut self, store: Arc<dyn Cache>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the TTL and keying policy
    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves the configuration. Missing wiring or a bad policy fails here.
    pub fn build(self) -> Result<CachingProxy<T>, DomainError> {
        let config = ConfigurationResolver::new(&self.policy).resolve(
            self.target,
            self.store,
            &self.operations,
        )?;

        Ok(CachingProxy { config })
    }
}

/// Routes calls on a wrapped implementation through the cache-aside protocol.
///
/// Holds no per-call state, so one instance can serve any number of
/// concurrent callers. Concurrent misses on the same key are not coalesced:
/// each one invokes the target and writes back.
///
/// Capability-set decorators hold one of these and forward every method
/// through [`CachingProxy::call`] or [`CachingProxy::call_blocking`].
#[derive(Debug)]
pub struct CachingProxy<T> {
    config: ProxyConfiguration<T>,
}

impl<T: CacheOwner> CachingProxy<T> {
    pub fn builder(operations: &[OperationSpec]) -> CachingProxyBuilder<T> {
        CachingProxyBuilder::new(operations)
    }
}

impl<T> CachingProxy<T> {
    pub fn target(&self) -> &T {
        self.config.target()
    }

    pub fn owner(&self) -> &'static str {
        self.config.owner()
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl()
    }

    pub fn store(&self) -> &Arc<dyn Cache> {
        self.config.store()
    }

    pub fn configuration(&self) -> &ProxyConfiguration<T> {
        &self.config
    }

    /// Key a call to `operation` with `args` reads and writes
    pub fn key_for(&self, operation: &str, args: &[KeyArg<'_>]) -> CacheKey {
        self.config
            .keys()
            .build(&OperationIdentity::new(self.owner(), operation), args)
    }

    /// Intercepts a deferred operation.
    ///
    /// On a hit the stored value is returned and `invoke` is never run. On a
    /// miss the target's result is written back with the configured TTL. Store
    /// failures degrade to a miss; errors from the target propagate unchanged
    /// and are never cached. Operations not declared deferred bypass the cache.
    pub async fn call<'a, R, E, F, Fut>(
        &'a self,
        operation: &str,
        args: &[KeyArg<'_>],
        invoke: F,
    ) -> Result<R, E>
    where
        R: Serialize + DeserializeOwned,
        F: FnOnce(&'a T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        if !self.admits(operation, Strategy::CacheAside) {
            record_cache_lookup(self.owner(), operation, LookupOutcome::Bypass);
            return invoke(self.target()).await;
        }

        let key = self.key_for(operation, args);
        let read = self.store().get_raw(key.as_str()).await;

        if let Some(value) = self.cached_value(operation, &key, read) {
            return Ok(value);
        }

        let value = invoke(self.target()).await?;

        if let Some(data) = self.encoded_value(operation, &key, &value) {
            let written = self.store().set_raw(key.as_str(), &data, self.ttl()).await;
            self.finish_write(operation, &key, written);
        }

        Ok(value)
    }

    /// Intercepts an immediate operation through the blocking store API.
    ///
    /// Same protocol as [`CachingProxy::call`]. With a network store this
    /// blocks the calling thread on I/O. Operations not declared immediate
    /// bypass the cache.
    pub fn call_blocking<'a, R, E, F>(
        &'a self,
        operation: &str,
        args: &[KeyArg<'_>],
        invoke: F,
    ) -> Result<R, E>
    where
        R: Serialize + DeserializeOwned,
        F: FnOnce(&'a T) -> Result<R, E>,
    {
        if !self.admits(operation, Strategy::CacheAsideBlocking) {
            record_cache_lookup(self.owner(), operation, LookupOutcome::Bypass);
            return invoke(self.target());
        }

        let key = self.key_for(operation, args);
        let read = self.store().get_raw_blocking(key.as_str());

        if let Some(value) = self.cached_value(operation, &key, read) {
            return Ok(value);
        }

        let value = invoke(self.target())?;

        if let Some(data) = self.encoded_value(operation, &key, &value) {
            let written = self
                .store()
                .set_raw_blocking(key.as_str(), &data, self.ttl());
            self.finish_write(operation, &key, written);
        }

        Ok(value)
    }

    fn strategy(&self, operation: &str) -> Strategy {
        match self.config.dispatch().strategy(operation) {
            Some(strategy) => strategy,
            None => {
                tracing::warn!(
                    owner = self.owner(),
                    operation,
                    "Operation not declared for caching, bypassing cache"
                );
                Strategy::Bypass
            }
        }
    }

    /// True when `operation` is cached through the store API `path` selects
    fn admits(&self, operation: &str, path: Strategy) -> bool {
        match self.strategy(operation) {
            declared if !declared.is_cached() => false,
            declared if declared == path => true,
            declared => {
                tracing::warn!(
                    owner = self.owner(),
                    operation,
                    declared = ?declared,
                    invoked = ?path,
                    "Operation routed through the wrong store API, bypassing cache"
                );
                false
            }
        }
    }

    fn cached_value<R: DeserializeOwned>(
        &self,
        operation: &str,
        key: &CacheKey,
        read: Result<Option<Vec<u8>>, DomainError>,
    ) -> Option<R> {
        let owner = self.owner();

        match read {
            Ok(Some(data)) => match decode_value(&data) {
                Ok(value) => {
                    tracing::debug!(owner, operation, key = %key, "Cache hit");
                    record_cache_lookup(owner, operation, LookupOutcome::Hit);
                    return Some(value);
                }
                Err(e) => {
                    tracing::warn!(
                        owner,
                        operation,
                        key = %key,
                        error = %e,
                        "Discarding undecodable cache entry"
                    );
                    record_store_error(owner, operation, StorePhase::Decode);
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    owner,
                    operation,
                    key = %key,
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                record_store_error(owner, operation, StorePhase::Read);
            }
        }

        tracing::debug!(owner, operation, key = %key, "Cache miss, invoking target");
        record_cache_lookup(owner, operation, LookupOutcome::Miss);
        None
    }

    fn encoded_value<R: Serialize>(
        &self,
        operation: &str,
        key: &CacheKey,
        value: &R,
    ) -> Option<Vec<u8>> {
        match encode_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(
                    owner = self.owner(),
                    operation,
                    key = %key,
                    error = %e,
                    "Result not cacheable, skipping write"
                );
                record_store_error(self.owner(), operation, StorePhase::Encode);
                None
            }
        }
    }

    fn finish_write(&self, operation: &str, key: &CacheKey, written: Result<(), DomainError>) {
        match written {
            Ok(()) => {
                tracing::debug!(
                    owner = self.owner(),
                    operation,
                    key = %key,
                    ttl_secs = self.ttl().as_secs(),
                    "Cached result"
                );
            }
            Err(e) => {
                tracing::warn!(
                    owner = self.owner(),
                    operation,
                    key = %key,
                    error = %e,
                    "Cache write failed, returning uncached result"
                );
                record_store_error(self.owner(), operation, StorePhase::Write);
            }
        }
    }
}
