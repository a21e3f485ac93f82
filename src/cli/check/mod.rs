//! Check command - round-trips a sample entry through the configured store

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::domain::cache::{Cache, CacheExt, KEY_NAMESPACE};
use crate::domain::DomainError;
use crate::infrastructure::cache::CacheFactory;

const SAMPLE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sample {
    pid: u32,
    nonce: u128,
}

impl Sample {
    fn new() -> Self {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        Self {
            pid: std::process::id(),
            nonce,
        }
    }
}

/// Outcome of one store check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub key: String,
    pub suspending: bool,
    pub blocking: bool,
    pub ttl: Option<Duration>,
}

impl CheckReport {
    pub fn is_healthy(&self) -> bool {
        self.suspending && self.blocking
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = |ok: bool| if ok { "ok" } else { "FAILED" };

        writeln!(f, "sample key: {}", self.key)?;
        writeln!(f, "async api:  {}", status(self.suspending))?;
        writeln!(f, "blocking:   {}", status(self.blocking))?;
        match self.ttl {
            Some(ttl) => write!(f, "ttl:        {}s", ttl.as_secs()),
            None => write!(f, "ttl:        none"),
        }
    }
}

/// Run the check command
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let store = CacheFactory::new().create(&config.cache).await?;

    tracing::info!(cache_type = %config.cache.cache_type, "Probing cache store");

    let report = round_trip(store).await?;
    println!("{}", report);

    if !report.is_healthy() {
        anyhow::bail!("cache store check failed");
    }

    Ok(())
}

/// Writes and reads back a sample through both store APIs
pub async fn round_trip(store: Arc<dyn Cache>) -> Result<CheckReport, DomainError> {
    let key = format!("{}:health:{}", KEY_NAMESPACE, std::process::id());

    let expected = Sample::new();
    store.set(&key, &expected, SAMPLE_TTL).await?;
    let read: Option<Sample> = store.get(&key).await?;
    let suspending = read.as_ref() == Some(&expected);

    let blocking_store = store.clone();
    let blocking_key = key.clone();
    let blocking = tokio::task::spawn_blocking(move || -> Result<bool, DomainError> {
        let expected = Sample::new();
        blocking_store.set_blocking(&blocking_key, &expected, SAMPLE_TTL)?;
        let read: Option<Sample> = blocking_store.get_blocking(&blocking_key)?;
        Ok(read == Some(expected))
    })
    .await
    .map_err(|e| DomainError::internal(format!("Blocking round trip panicked: {}", e)))??;

    let ttl = store.ttl(&key).await?;

    Ok(CheckReport {
        key,
        suspending,
        blocking,
        ttl,
    })
}
