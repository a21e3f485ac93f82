//! In-memory cache implementation using moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::sync::Cache as MokaCache;
use moka::Expiry;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryCacheConfig {
    /// Sets the maximum number of entries
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Cache entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    ttl: Duration,
    stored_at: Instant,
}

/// Expires every entry after the TTL it was written with
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe in-memory cache implementation using moka
///
/// Features:
/// - TTL support per entry
/// - LRU-like eviction when capacity is reached
/// - Same store behind the suspending and the blocking API
#[derive(Debug, Clone)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
    config: InMemoryCacheConfig,
}

impl InMemoryCache {
    /// Creates a new in-memory cache with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    /// Creates a new in-memory cache with the given configuration
    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self { cache, config }
    }

    pub fn config(&self) -> &InMemoryCacheConfig {
        &self.config
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key).map(|entry| entry.data)
    }

    fn write(&self, key: &str, value: &[u8], ttl: Duration) {
        let entry = CacheEntry {
            data: value.to_vec(),
            ttl,
            stored_at: Instant::now(),
        };

        self.cache.insert(key.to_string(), entry);
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(self.read(key))
    }

    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
        self.write(key, value, ttl);
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        Ok(self
            .cache
            .get(key)
            .map(|entry| entry.ttl.saturating_sub(entry.stored_at.elapsed())))
    }

    fn get_raw_blocking(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(self.read(key))
    }

    fn set_raw_blocking(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
        self.write(key, value, ttl);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = InMemoryCache::new();

        let result: Option<String> = cache.get("missing").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = InMemoryCache::new();

        cache.set("key", &1u32, Duration::from_secs(60)).await.unwrap();
        cache.set("key", &2u32, Duration::from_secs(60)).await.unwrap();

        let result: Option<u32> = cache.get("key").await.unwrap();
        assert_eq!(result, Some(2));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();

        cache
            .set("short", &"value", Duration::from_millis(50))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        let result: Option<String> = cache.get("short").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_ttl_reports_remaining_lifetime() {
        let cache = InMemoryCache::new();

        cache.set("key", &"v", Duration::from_secs(60)).await.unwrap();

        let remaining = cache.ttl("key").await.unwrap().unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(55));

        assert!(cache.ttl("missing").await.unwrap().is_none());
    }

    #[test]
    fn test_blocking_and_async_share_entries() {
        let cache = InMemoryCache::new();

        cache
            .set_blocking("shared", &vec!["a", "b"], Duration::from_secs(60))
            .unwrap();

        let blocking: Option<Vec<String>> = cache.get_blocking("shared").unwrap();
        assert_eq!(blocking, Some(vec!["a".to_string(), "b".to_string()]));

        let via_async: Option<Vec<String>> =
            tokio_test::block_on(cache.get("shared")).unwrap();
        assert_eq!(via_async, blocking);
    }

    #[test]
    fn test_entry_count() {
        let config = InMemoryCacheConfig::default().with_max_capacity(10);
        let cache = InMemoryCache::with_config(config);

        cache.set_blocking("a", &1, Duration::from_secs(60)).unwrap();
        cache.set_blocking("b", &2, Duration::from_secs(60)).unwrap();

        assert_eq!(cache.entry_count(), 2);
        assert_eq!(cache.config().max_capacity, 10);
    }
}
