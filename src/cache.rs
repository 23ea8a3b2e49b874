//! Bounded in-memory cache for translations and trend scores
//!
//! Entries are keyed strings holding any serializable value. The cache never
//! grows beyond its capacity (least recently used entries are evicted) and
//! every entry carries a time-to-live; expired entries are dropped when read.

use std::fmt::Debug;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use rand::RngExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::CacheConfig;
use crate::{DishcastError, Result};

struct StoredEntry {
    value: Value,
    expires_at: Instant,
}

pub struct Cache {
    store: Mutex<LruCache<String, StoredEntry>>,
    ttl: Duration,
}

impl Cache {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| DishcastError::cache("Cache capacity must be greater than zero"))?;
        Ok(Self {
            store: Mutex::new(LruCache::new(capacity)),
            ttl,
        })
    }

    /// Build the cache described by the configuration, or `None` when disabled
    pub fn from_config(config: &CacheConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let ttl = Duration::from_secs(u64::from(config.ttl_minutes) * 60);
        Self::new(config.capacity as usize, ttl).map(Some)
    }

    /// Stores a serializable value using the cache TTL.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self))]
    pub async fn put<T: Serialize + Debug>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| DishcastError::cache(format!("Failed to serialize entry: {e}")))?;
        let entry = StoredEntry {
            value,
            expires_at: Instant::now() + jittered(self.ttl),
        };

        if let Some((evicted, _)) = self.store.lock().await.push(key.to_string(), entry) {
            if evicted != key {
                tracing::debug!("Evicted least recently used key {}", evicted);
            }
        }
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut store = self.store.lock().await;

        let Some(entry) = store.get(key) else {
            tracing::debug!("Key not found");
            return Ok(None);
        };
        let expired = Instant::now() >= entry.expires_at;
        let value = entry.value.clone();

        if expired {
            tracing::debug!("Key found but expired");
            store.pop(key);
            return Ok(None);
        }
        tracing::debug!("Key found and still fresh");

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| DishcastError::cache(format!("Failed to decode entry: {e}")))
    }

    /// Number of entries currently held, expired ones included
    #[cfg(test)]
    async fn len(&self) -> usize {
        self.store.lock().await.len()
    }
}

/// Spread expiries so entries written together do not expire together
fn jittered(ttl: Duration) -> Duration {
    let jitter: f64 = rand::rng().random_range(0.9..1.1);
    ttl.mul_f64(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = Cache::new(4, Duration::from_secs(60)).unwrap();
        cache.put("trend:malatang", &42.5_f64).await.unwrap();
        let value: Option<f64> = cache.get("trend:malatang").await.unwrap();
        assert_eq!(value, Some(42.5));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = Cache::new(4, Duration::from_secs(60)).unwrap();
        let value: Option<String> = cache.get("nothing").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_read() {
        let cache = Cache::new(4, Duration::ZERO).unwrap();
        cache.put("translate:成都", &"Chengdu").await.unwrap();
        let value: Option<String> = cache.get("translate:成都").await.unwrap();
        assert!(value.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let cache = Cache::new(2, Duration::from_secs(60)).unwrap();
        cache.put("a", &1_u32).await.unwrap();
        cache.put("b", &2_u32).await.unwrap();
        cache.put("c", &3_u32).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get::<u32>("a").await.unwrap(), None);
        assert_eq!(cache.get::<u32>("c").await.unwrap(), Some(3));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(Cache::new(0, Duration::from_secs(60)).is_err());
    }

    #[test]
    fn test_disabled_config_builds_nothing() {
        let config = CacheConfig::default();
        assert!(Cache::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let ttl = Duration::from_secs(100);
        for _ in 0..50 {
            let jittered = jittered(ttl);
            assert!(jittered >= Duration::from_secs(90));
            assert!(jittered <= Duration::from_secs(110));
        }
    }
}
