//! Remote key-value store contract

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Key-value store with per-entry TTL, in suspending and blocking forms.
///
/// Implementations must be safe for concurrent use: one handle is shared by
/// every call of every proxy wired to it. Only per-key atomicity is assumed.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets the stored bytes for `key`, `None` on miss
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Stores bytes under `key`, expiring after `ttl`
    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError>;

    /// Remaining lifetime of `key`, `None` if absent or without expiry
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError>;

    /// Blocking form of [`Cache::get_raw`]
    fn get_raw_blocking(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Blocking form of [`Cache::set_raw`]
    fn set_raw_blocking(&self, key: &str, value: &[u8], ttl: Duration)
        -> Result<(), DomainError>;
}

/// Encodes a value into the stored JSON form
pub fn encode_value<V: Serialize + ?Sized>(value: &V) -> Result<Vec<u8>, DomainError> {
    serde_json::to_vec(value).map_err(|e| {
        DomainError::serialization(format!("Failed to serialize cache value: {}", e))
    })
}

/// Decodes stored JSON bytes
pub fn decode_value<V: DeserializeOwned>(data: &[u8]) -> Result<V, DomainError> {
    serde_json::from_slice(data).map_err(|e| {
        DomainError::serialization(format!("Failed to deserialize cache value: {}", e))
    })
}

/// Extension trait providing typed JSON get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => decode_value(&data).map(Some),
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = encode_value(value)?;
            self.set_raw(key, &data, ttl).await
        }
    }

    /// Blocking form of [`CacheExt::get`]
    fn get_blocking<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>, DomainError> {
        match self.get_raw_blocking(key)? {
            Some(data) => decode_value(&data).map(Some),
            None => Ok(None),
        }
    }

    /// Blocking form of [`CacheExt::set`]
    fn set_blocking<V: Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let data = encode_value(value)?;
        self.set_raw_blocking(key, &data, ttl)
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock cache for testing
    #[derive(Debug, Default)]
    pub struct MockCache {
        entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
        read_error: Mutex<Option<String>>,
        write_error: Mutex<Option<String>>,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl MockCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry<V: Serialize>(self, key: &str, value: &V, ttl: Duration) -> Self {
            let json = serde_json::to_vec(value).unwrap();
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (json, ttl));
            self
        }

        pub fn with_raw_entry(self, key: &str, data: &[u8], ttl: Duration) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (data.to_vec(), ttl));
            self
        }

        /// Fails both reads and writes
        pub fn with_error(self, error: impl Into<String>) -> Self {
            let error = error.into();
            *self.read_error.lock().unwrap() = Some(error.clone());
            *self.write_error.lock().unwrap() = Some(error);
            self
        }

        pub fn with_read_error(self, error: impl Into<String>) -> Self {
            *self.read_error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn with_write_error(self, error: impl Into<String>) -> Self {
            *self.write_error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }

        /// TTL recorded by the last write to `key`
        pub fn stored_ttl(&self, key: &str) -> Option<Duration> {
            self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
        }

        pub fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn read(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = self.read_error.lock().unwrap().clone() {
                return Err(DomainError::cache_unavailable(error));
            }

            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(key)
                .map(|(data, _)| data.clone()))
        }

        fn write(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = self.write_error.lock().unwrap().clone() {
                return Err(DomainError::cache_unavailable(error));
            }

            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_vec(), ttl));
            Ok(())
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
            self.read(key)
        }

        async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
            self.write(key, value, ttl)
        }

        async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
            Ok(self.stored_ttl(key))
        }

        fn get_raw_blocking(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
            self.read(key)
        }

        fn set_raw_blocking(
            &self,
            key: &str,
            value: &[u8],
            ttl: Duration,
        ) -> Result<(), DomainError> {
            self.write(key, value, ttl)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_cache_set_get() {
            let cache = MockCache::new();
            cache
                .set("key1", &"value1", Duration::from_secs(60))
                .await
                .unwrap();

            let result: Option<String> = cache.get("key1").await.unwrap();
            assert_eq!(result, Some("value1".to_string()));
            assert_eq!(cache.stored_ttl("key1"), Some(Duration::from_secs(60)));
        }

        #[tokio::test]
        async fn test_mock_cache_get_missing() {
            let cache = MockCache::new();

            let result: Option<String> = cache.get("missing").await.unwrap();
            assert!(result.is_none());
        }

        #[tokio::test]
        async fn test_mock_cache_with_error() {
            let cache = MockCache::new().with_error("Test error");

            let result: Result<Option<String>, _> = cache.get("key").await;
            assert!(matches!(result, Err(DomainError::CacheUnavailable { .. })));
        }

        #[tokio::test]
        async fn test_mock_cache_write_error_only() {
            let cache = MockCache::new()
                .with_entry("present", &1u32, Duration::from_secs(60))
                .with_write_error("read only");

            let value: Option<u32> = cache.get("present").await.unwrap();
            assert_eq!(value, Some(1));

            let result = cache.set("other", &2u32, Duration::from_secs(60)).await;
            assert!(result.is_err());
        }

        #[test]
        fn test_blocking_round_trip() {
            let cache = MockCache::new();
            cache
                .set_blocking("key", &vec![1, 2, 3], Duration::from_secs(5))
                .unwrap();

            let value: Option<Vec<i32>> = cache.get_blocking("key").unwrap();
            assert_eq!(value, Some(vec![1, 2, 3]));
        }

        #[tokio::test]
        async fn test_undecodable_entry_is_serialization_error() {
            let cache = MockCache::new().with_raw_entry("key", b"not json", Duration::from_secs(5));

            let result: Result<Option<u32>, _> = cache.get("key").await;
            assert!(matches!(result, Err(DomainError::Serialization { .. })));
        }
    }
}
