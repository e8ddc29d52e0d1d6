//! Cache storage: the backend-agnostic trait and the in-process TTL map.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use super::config::{CacheBackendKind, CacheConfig};
use super::redis::RedisCache;

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache connection pool error: {0}")]
    Pool(String),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backend-agnostic key-value cache.
///
/// A missing key is `Ok(None)`, never an error; `CacheError` is reserved for
/// transport, pool, and serialization failures. `invalidate` must have purged
/// every matching key by the time it returns; partial invalidation across a
/// backend scan is a correctness bug, not a degraded mode.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Purge every key matching any of the glob-like `prefix*` patterns.
    ///
    /// Patterns are verb-agnostic; a `verb` narrows the match to keys derived
    /// with that HTTP method.
    async fn invalidate(&self, patterns: &[String], verb: Option<&str>) -> Result<(), CacheError>;
}

/// Build the configured [`CacheStore`] implementation.
///
/// With `cache.enabled = false` every read is a miss and every write and
/// invalidation a no-op, so callers keep one code path.
pub fn build_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    if !config.enabled {
        return Ok(Arc::new(NullCache));
    }
    match config.backend {
        CacheBackendKind::Memory => Ok(Arc::new(MemoryCache::new())),
        CacheBackendKind::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                CacheError::Backend("cache.redis_url is required for the redis backend".into())
            })?;
            Ok(Arc::new(RedisCache::connect(url, config)?))
        }
    }
}

/// Pass-through backend used when caching is disabled.
struct NullCache;

#[async_trait]
impl CacheStore for NullCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(
        &self,
        _patterns: &[String],
        _verb: Option<&str>,
    ) -> Result<(), CacheError> {
        Ok(())
    }
}

// ============================================================================
// Lock helpers
// ============================================================================

fn rw_read<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = SOURCE,
                lock_kind = "rwlock.read",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}

fn rw_write<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = SOURCE,
                lock_kind = "rwlock.write",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}

// ============================================================================
// In-process backend
// ============================================================================

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Single-instance TTL map backend.
///
/// Expired entries are dropped lazily on access; `invalidate` matches by
/// substring containment of the glob-stripped pattern, which over-approximates
/// the Redis MATCH semantics (purging too much is safe, purging too little is
/// not).
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, "len")
            .values()
            .filter(|entry| !entry.is_expired())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A pattern like `/customers/*` matches any key containing `/customers/`.
    fn match_fragment(pattern: &str, verb: Option<&str>) -> String {
        let stripped: String = pattern.chars().filter(|c| *c != '*').collect();
        match verb {
            Some(verb) => format!("{verb}:{stripped}"),
            None => stripped,
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let entries = rw_read(&self.entries, "get");
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Seen expired above; drop it under the write lock.
        rw_write(&self.entries, "get.expire").remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let entry = MemoryEntry {
            value: value.to_owned(),
            expires_at: Instant::now() + ttl,
        };
        rw_write(&self.entries, "set").insert(key.to_owned(), entry);
        Ok(())
    }

    async fn invalidate(&self, patterns: &[String], verb: Option<&str>) -> Result<(), CacheError> {
        let mut entries = rw_write(&self.entries, "invalidate");
        for pattern in patterns {
            let fragment = Self::match_fragment(pattern, verb);
            let before = entries.len();
            entries.retain(|key, _| !key.contains(&fragment));
            debug!(
                pattern = %pattern,
                fragment = %fragment,
                purged = before - entries.len(),
                "cache invalidated (memory)"
            );
        }
        Ok(())
    }
}
