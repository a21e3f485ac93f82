//! Inspect command - shows what the store holds for a key

use std::fmt;
use std::time::Duration;

use clap::Args;

use crate::config::AppConfig;
use crate::domain::cache::{decode_value, Cache};
use crate::domain::DomainError;
use crate::infrastructure::cache::CacheFactory;

/// Arguments for the inspect command
#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    /// Full cache key, e.g. repo:CustomerRepository:filter_by_city:Lisbon
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub key: String,
    pub size: Option<usize>,
    pub ttl: Option<Duration>,
    pub value: Option<serde_json::Value>,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(size) = self.size else {
            return write!(f, "{}: absent", self.key);
        };

        writeln!(f, "{}: present ({} bytes)", self.key, size)?;
        match self.ttl {
            Some(ttl) => writeln!(f, "ttl: {}s", ttl.as_secs())?,
            None => writeln!(f, "ttl: none")?,
        }
        match &self.value {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "<not JSON>"),
        }
    }
}

/// Run the inspect command
pub async fn run(args: InspectArgs, config: &AppConfig) -> anyhow::Result<()> {
    let store = CacheFactory::new().create(&config.cache).await?;
    let inspection = inspect(store.as_ref(), &args.key).await?;

    println!("{}", inspection);
    Ok(())
}

pub async fn inspect(store: &dyn Cache, key: &str) -> Result<Inspection, DomainError> {
    let Some(data) = store.get_raw(key).await? else {
        return Ok(Inspection {
            key: key.to_string(),
            size: None,
            ttl: None,
            value: None,
        });
    };

    Ok(Inspection {
        key: key.to_string(),
        size: Some(data.len()),
        ttl: store.ttl(key).await?,
        value: decode_value(&data).ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;
    use crate::infrastructure::cache::InMemoryCache;

    #[tokio::test]
    async fn test_inspect_present_entry() {
        let store = InMemoryCache::new();
        store
            .set("repo:Customers:count:Lisbon", &2u64, Duration::from_secs(60))
            .await
            .unwrap();

        let inspection = inspect(&store, "repo:Customers:count:Lisbon").await.unwrap();

        assert_eq!(inspection.size, Some(1));
        assert_eq!(inspection.value, Some(serde_json::json!(2)));
        assert!(inspection.ttl.unwrap() > Duration::from_secs(50));
        assert!(inspection.to_string().contains("present (1 bytes)"));
    }

    #[tokio::test]
    async fn test_inspect_absent_entry() {
        let store = InMemoryCache::new();

        let inspection = inspect(&store, "repo:Customers:count:Porto").await.unwrap();

        assert_eq!(inspection.size, None);
        assert_eq!(inspection.to_string(), "repo:Customers:count:Porto: absent");
    }

    #[tokio::test]
    async fn test_inspect_non_json_entry() {
        let store = InMemoryCache::new();
        store
            .set_raw("raw", b"\xff\xfe", Duration::from_secs(60))
            .await
            .unwrap();

        let inspection = inspect(&store, "raw").await.unwrap();

        assert_eq!(inspection.size, Some(2));
        assert!(inspection.value.is_none());
        assert!(inspection.to_string().ends_with("<not JSON>"));
    }
}
