//! Construction-time resolution of proxy wiring and TTL policy

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::{Cache, KeyBuilder};
use crate::domain::predicate::CompositeKeying;
use crate::domain::DomainError;

use super::dispatch::DispatchPolicy;
use super::operation::{validate_key_segment, CacheOwner, OperationSpec};

/// TTL applied when neither the owner nor the caller supplies one
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Declared cache policy, keyed by wrapped-type identity.
///
/// Owner TTLs are in minutes; values `<= 0` count as "not declared".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Fallback for owners without a positive declared TTL
    pub default_ttl_minutes: Option<i64>,
    /// Per-owner TTL in minutes
    pub owners: HashMap<String, i64>,
    /// Rendering of AND/OR groups in predicate keys
    pub composite_keying: CompositeKeying,
}

impl CachePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the caller-supplied default TTL
    pub fn with_default_ttl_minutes(mut self, minutes: i64) -> Self {
        self.default_ttl_minutes = Some(minutes);
        self
    }

    /// Declares a TTL for one owner
    pub fn with_owner_ttl_minutes(mut self, owner: impl Into<String>, minutes: i64) -> Self {
        self.owners.insert(owner.into(), minutes);
        self
    }

    pub fn with_composite_keying(mut self, keying: CompositeKeying) -> Self {
        self.composite_keying = keying;
        self
    }
}

fn minutes(value: i64) -> Option<Duration> {
    u64::try_from(value)
        .ok()
        .and_then(|m| m.checked_mul(60))
        .map(Duration::from_secs)
}

/// Bound wiring for one wrapped type. Immutable once built.
pub struct ProxyConfiguration<T> {
    owner: &'static str,
    target: T,
    store: Arc<dyn Cache>,
    ttl: Duration,
    keys: KeyBuilder,
    dispatch: DispatchPolicy,
}

impl<T> ProxyConfiguration<T> {
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn store(&self) -> &Arc<dyn Cache> {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn keys(&self) -> &KeyBuilder {
        &self.keys
    }

    pub fn dispatch(&self) -> &DispatchPolicy {
        &self.dispatch
    }
}

impl<T> fmt::Debug for ProxyConfiguration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfiguration")
            .field("owner", &self.owner)
            .field("target", &"<target>")
            .field("store", &self.store)
            .field("ttl", &self.ttl)
            .field("keys", &self.keys)
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

/// Turns a [`CachePolicy`] plus wiring into a [`ProxyConfiguration`]
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationResolver<'a> {
    policy: &'a CachePolicy,
}

impl<'a> ConfigurationResolver<'a> {
    pub fn new(policy: &'a CachePolicy) -> Self {
        Self { policy }
    }

    /// Effective TTL for `owner`.
    ///
    /// A positive declared owner TTL wins, then the caller default, then
    /// [`DEFAULT_TTL`]. A caller default `<= 0` is rejected.
    pub fn resolve_ttl(&self, owner: &str) -> Result<Duration, DomainError> {
        let fallback = match self.policy.default_ttl_minutes {
            None => DEFAULT_TTL,
            Some(value) if value > 0 => minutes(value).ok_or_else(|| {
                DomainError::configuration(format!("Default TTL of {} minutes overflows", value))
            })?,
            Some(value) => {
                return Err(DomainError::configuration(format!(
                    "Default TTL must be positive, got {} minutes",
                    value
                )));
            }
        };

        let declared = self
            .declared_minutes(owner)
            .filter(|value| *value > 0);

        match declared {
            Some(value) => minutes(value).ok_or_else(|| {
                DomainError::configuration(format!(
                    "TTL of {} minutes declared for '{}' overflows",
                    value, owner
                ))
            }),
            None => Ok(fallback),
        }
    }

    // Environment-sourced keys arrive lower-cased, so an exact match wins
    // and a case-insensitive one is the fallback. Among several
    // case-insensitive matches the smallest name wins.
    fn declared_minutes(&self, owner: &str) -> Option<i64> {
        self.policy.owners.get(owner).copied().or_else(|| {
            self.policy
                .owners
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case(owner))
                .min_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(_, minutes)| *minutes)
        })
    }

    /// Validates the wiring and produces the immutable configuration
    pub fn resolve<T: CacheOwner>(
        &self,
        target: Option<T>,
        store: Option<Arc<dyn Cache>>,
        operations: &[OperationSpec],
    ) -> Result<ProxyConfiguration<T>, DomainError> {
        let owner = T::OWNER;
        validate_key_segment("Owner", owner)?;

        let target = target.ok_or_else(|| {
            DomainError::configuration(format!(
                "Target implementation is required for '{}'",
                owner
            ))
        })?;
        let store = store.ok_or_else(|| {
            DomainError::configuration(format!(
                "Cache store handle is required for '{}'",
                owner
            ))
        })?;

        let ttl = self.resolve_ttl(owner)?;
        let dispatch = DispatchPolicy::classify(operations)?;
        let keys = KeyBuilder::new(self.policy.composite_keying);

        tracing::debug!(
            owner,
            ttl_secs = ttl.as_secs(),
            operations = dispatch.len(),
            keying = %keys.keying(),
            "Resolved cache proxy configuration"
        );

        Ok(ProxyConfiguration {
            owner,
            target,
            store,
            ttl,
            keys,
            dispatch,
        })
    }
}
