//! Cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// In-process store using moka
    #[default]
    InMemory,
    /// Redis cache
    Redis,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Store selection and connection settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Type of cache to create
    #[serde(rename = "type")]
    pub cache_type: CacheType,
    /// Redis URL (required for Redis type)
    pub redis_url: Option<String>,
    /// Prefix prepended to every Redis key
    pub key_prefix: Option<String>,
    /// Maximum capacity (for in-memory cache)
    pub max_capacity: u64,
    /// Redis connect timeout in seconds
    pub connection_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::InMemory,
            redis_url: None,
            key_prefix: None,
            max_capacity: 10_000,
            connection_timeout_secs: 5,
        }
    }
}

impl CacheConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            cache_type: CacheType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_connection_timeout_secs(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the store handle described by `config`
    pub async fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        match config.cache_type {
            CacheType::InMemory => {
                let in_memory_config =
                    InMemoryCacheConfig::default().with_max_capacity(config.max_capacity);

                tracing::debug!(max_capacity = config.max_capacity, "Creating in-memory cache");
                Ok(Arc::new(InMemoryCache::with_config(in_memory_config)))
            }
            CacheType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for Redis cache type")
                })?;

                let mut redis_config = RedisCacheConfig::new(url).with_connection_timeout(
                    Duration::from_secs(config.connection_timeout_secs),
                );

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                let cache = RedisCache::new(redis_config).await?;
                Ok(Arc::new(cache))
            }
        }
    }

    /// Creates an in-memory cache with default settings
    pub fn create_in_memory(&self) -> Arc<dyn Cache> {
        Arc::new(InMemoryCache::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[test]
    fn test_cache_type_from_str() {
        assert_eq!("in_memory".parse::<CacheType>().unwrap(), CacheType::InMemory);
        assert_eq!("memory".parse::<CacheType>().unwrap(), CacheType::InMemory);
        assert_eq!("REDIS".parse::<CacheType>().unwrap(), CacheType::Redis);
    }

    #[test]
    fn test_cache_type_from_str_invalid() {
        let result = "memcached".parse::<CacheType>();
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_cache_type_display() {
        assert_eq!(CacheType::InMemory.to_string(), "in_memory");
        assert_eq!(CacheType::Redis.to_string(), "redis");
    }

    #[test]
    fn test_cache_config_builders() {
        let config = CacheConfig::redis("redis://localhost:6379")
            .with_key_prefix("myapp")
            .with_connection_timeout_secs(2);

        assert_eq!(config.cache_type, CacheType::Redis);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.key_prefix.as_deref(), Some("myapp"));
        assert_eq!(config.connection_timeout_secs, 2);
    }

    #[test]
    fn test_cache_config_deserializes_type_field() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"type": "redis", "redis_url": "redis://cache:6379"}"#)
                .unwrap();

        assert_eq!(config.cache_type, CacheType::Redis);
        assert_eq!(config.max_capacity, 10_000);
    }

    #[tokio::test]
    async fn test_factory_create_in_memory() {
        let factory = CacheFactory::new();
        let cache = factory
            .create(&CacheConfig::in_memory().with_max_capacity(100))
            .await
            .unwrap();

        cache
            .set("test", &"value", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("test").await.unwrap();
        assert_eq!(result, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_factory_create_redis_missing_url() {
        let factory = CacheFactory::new();
        let config = CacheConfig {
            cache_type: CacheType::Redis,
            ..Default::default()
        };

        let result = factory.create(&config).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
