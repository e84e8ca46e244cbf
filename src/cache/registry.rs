//! Cache Registry Module
//!
//! Explicitly constructed, named cache handles. The application composes a
//! registry once at startup and passes it (or individual handles) to the
//! code that needs a cache.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{Clock, MemoryCache, SystemClock};
use crate::config::Config;

// == Shared Cache ==
/// Cloneable handle to a cache shared between tasks.
pub type SharedCache<V, C = SystemClock> = Arc<RwLock<MemoryCache<String, V, C>>>;

/// Wraps a cache in a [`SharedCache`] handle.
pub fn shared<V, C: Clock>(cache: MemoryCache<String, V, C>) -> SharedCache<V, C> {
    Arc::new(RwLock::new(cache))
}

// == Cache Registry ==
/// Named caches holding JSON values.
#[derive(Debug)]
pub struct CacheRegistry<C = SystemClock> {
    caches: BTreeMap<String, SharedCache<Value, C>>,
}

impl<C> Default for CacheRegistry<C> {
    fn default() -> Self {
        Self {
            caches: BTreeMap::new(),
        }
    }
}

impl CacheRegistry<SystemClock> {
    /// Builds one cache per configured name, all sharing the configured
    /// default TTL and capacity bound.
    pub fn from_config(config: &Config) -> Self {
        config
            .cache_names
            .iter()
            .fold(Self::new(), |registry, name| {
                let cache = MemoryCache::new()
                    .with_default_ttl(Duration::from_millis(config.default_ttl_ms))
                    .with_max_entries(config.max_entries);
                registry.with_cache(name.clone(), cache)
            })
    }
}

impl<C: Clock> CacheRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the cache registered under `name`.
    pub fn with_cache(
        mut self,
        name: impl Into<String>,
        cache: MemoryCache<String, Value, C>,
    ) -> Self {
        self.caches.insert(name.into(), shared(cache));
        self
    }

    /// Returns a handle to the cache named `name`.
    pub fn get(&self, name: &str) -> Option<SharedCache<Value, C>> {
        self.caches.get(name).cloned()
    }

    /// Registered cache names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    // == Purge ==
    /// Runs [`MemoryCache::purge_expired`] on every cache.
    ///
    /// Locks one cache at a time. Returns the total number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let mut total = 0;
        for (name, cache) in &self.caches {
            let removed = cache.write().await.purge_expired();
            if removed > 0 {
                debug!("Purged {} expired entries from cache '{}'", removed, name);
            }
            total += removed;
        }
        total
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use serde_json::json;

    #[test]
    fn test_registry_from_config() {
        let config = Config {
            default_ttl_ms: 1_000,
            max_entries: 10,
            ..Config::default()
        };

        let registry = CacheRegistry::from_config(&config);

        assert_eq!(registry.names(), vec!["default", "orders", "products", "users"]);
        assert!(registry.get("products").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_registry_handles_share_state() {
        let registry = CacheRegistry::from_config(&Config::default());

        let writer = registry.get("orders").unwrap();
        writer.write().await.set("o-1".to_string(), json!({"total": 10}));

        let reader = registry.get("orders").unwrap();
        let mut cache = reader.write().await;
        assert_eq!(cache.get("o-1"), Some(&json!({"total": 10})));
        assert_eq!(cache.max_entries(), None);
    }

    #[tokio::test]
    async fn test_registry_caches_are_isolated() {
        let registry = CacheRegistry::from_config(&Config::default());

        registry
            .get("users")
            .unwrap()
            .write()
            .await
            .set("u".to_string(), json!(1));

        assert!(!registry.get("products").unwrap().write().await.has("u"));
    }

    #[tokio::test]
    async fn test_registry_purge_expired() {
        let clock = ManualClock::new(0);
        let registry = CacheRegistry::new()
            .with_cache("a", MemoryCache::with_clock(clock.clone()))
            .with_cache("b", MemoryCache::with_clock(clock.clone()));

        for name in ["a", "b"] {
            let cache = registry.get(name).unwrap();
            let mut cache = cache.write().await;
            cache.set_with_ttl("short".to_string(), json!(1), Duration::from_millis(10));
            cache.set_with_ttl("long".to_string(), json!(2), Duration::from_secs(10));
        }

        clock.advance(Duration::from_millis(10));

        assert_eq!(registry.purge_expired().await, 2);
        assert_eq!(registry.purge_expired().await, 0);
        assert_eq!(registry.len(), 2);
    }
}
