//! Redis cache implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Commands};

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Connection timeout
    pub connection_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis cache implementation
///
/// Suspending calls share one multiplexed `ConnectionManager`. Blocking calls
/// open a short-lived synchronous connection and must not run on an async
/// executor thread.
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    /// Creates a new Redis cache connection
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            DomainError::configuration(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = tokio::time::timeout(
            config.connection_timeout,
            ConnectionManager::new(client.clone()),
        )
        .await
        .map_err(|_| {
            DomainError::cache_unavailable(format!(
                "Timed out connecting to Redis after {:?}",
                config.connection_timeout
            ))
        })?
        .map_err(|e| DomainError::cache_unavailable(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!(url = %config.url, prefix = ?config.key_prefix, "Connected to Redis");

        Ok(Self {
            client,
            connection,
            config,
        })
    }

    /// Creates a Redis cache with default configuration
    pub async fn with_url(url: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(RedisCacheConfig::new(url)).await
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn blocking_connection(&self) -> Result<redis::Connection, DomainError> {
        self.client
            .get_connection_with_timeout(self.config.connection_timeout)
            .map_err(|e| {
                DomainError::cache_unavailable(format!("Failed to connect to Redis: {}", e))
            })
    }

    // SETEX rejects 0, so sub-second TTLs round up to one second
    fn ttl_secs(ttl: Duration) -> u64 {
        ttl.as_secs().max(1)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Option<Vec<u8>> = conn.get(&prefixed_key).await.map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to get key '{}': {}", key, e))
        })?;

        Ok(result)
    }

    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let _: () = conn
            .set_ex(&prefixed_key, value, Self::ttl_secs(ttl))
            .await
            .map_err(|e| {
                DomainError::cache_unavailable(format!("Failed to set key '{}': {}", key, e))
            })?;

        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let ttl_secs: i64 = conn.ttl(&prefixed_key).await.map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to get TTL for key '{}': {}", key, e))
        })?;

        // Redis returns -2 if key doesn't exist, -1 if no TTL
        if ttl_secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl_secs as u64)))
        }
    }

    fn get_raw_blocking(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.blocking_connection()?;

        conn.get(&prefixed_key).map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to get key '{}': {}", key, e))
        })
    }

    fn set_raw_blocking(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.blocking_connection()?;

        conn.set_ex::<_, _, ()>(&prefixed_key, value, Self::ttl_secs(ttl))
            .map_err(|e| {
                DomainError::cache_unavailable(format!("Failed to set key '{}': {}", key, e))
            })
    }
}
