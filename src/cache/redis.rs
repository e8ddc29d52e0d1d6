//! Redis-backed cache store.
//!
//! Values are stored as JSON text with a `SET EX` lifetime, so the backend
//! owns entry expiry. Pattern invalidation walks `SCAN` cursors to
//! exhaustion: a scan that stops after the first page silently strands every
//! key beyond it, which then masks fresh writes until the TTL elapses.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config as RedisPoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use tracing::debug;

use super::config::CacheConfig;
use super::store::{CacheError, CacheStore};

/// The two commands the invalidation walk issues. Narrowing the connection to
/// this seam lets the cursor loop be driven by a scripted sequence of pages
/// in tests.
#[async_trait]
trait ScanBackend {
    async fn scan_page(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), CacheError>;

    async fn delete(&mut self, keys: Vec<String>) -> Result<(), CacheError>;
}

#[async_trait]
impl ScanBackend for deadpool_redis::Connection {
    async fn scan_page(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), CacheError> {
        redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(self)
            .await
            .map_err(|err| CacheError::Backend(format!("SCAN failed: {err}")))
    }

    async fn delete(&mut self, keys: Vec<String>) -> Result<(), CacheError> {
        self.del::<_, ()>(keys)
            .await
            .map_err(|err| CacheError::Backend(format!("DEL failed: {err}")))
    }
}

/// Delete every key matching `pattern`, following the cursor until the
/// backend returns the 0 sentinel. A page may be empty while the cursor is
/// still live; only the sentinel ends the walk. Returns the number of keys
/// deleted.
async fn purge_pattern<B: ScanBackend + Send>(
    backend: &mut B,
    pattern: &str,
    batch_size: usize,
) -> Result<usize, CacheError> {
    let mut cursor: u64 = 0;
    let mut purged = 0usize;

    loop {
        let (next, keys) = backend.scan_page(cursor, pattern, batch_size).await?;

        if !keys.is_empty() {
            purged += keys.len();
            backend.delete(keys).await?;
        }

        cursor = next;
        if cursor == 0 {
            break;
        }
    }

    Ok(purged)
}

pub struct RedisCache {
    pool: Pool,
    scan_batch_size: usize,
}

impl RedisCache {
    /// Create a pooled client for `url`.
    pub fn connect(url: &str, config: &CacheConfig) -> Result<Self, CacheError> {
        let pool = RedisPoolConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|err| CacheError::Pool(err.to_string()))?;

        Ok(Self {
            pool,
            scan_batch_size: config.scan_batch_size_non_zero(),
        })
    }

    /// Wrap an already-configured pool.
    pub fn from_pool(pool: Pool, config: &CacheConfig) -> Self {
        Self {
            pool,
            scan_batch_size: config.scan_batch_size_non_zero(),
        }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| CacheError::Pool(err.to_string()))
    }

    /// Verb-agnostic patterns must match keys derived with any HTTP method,
    /// so the verb position is globbed.
    fn full_pattern(pattern: &str, verb: Option<&str>) -> String {
        match verb {
            Some(verb) => format!("{verb}:{pattern}"),
            None => format!("*:{pattern}"),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|err| CacheError::Backend(format!("GET failed: {err}")))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(|err| CacheError::Backend(format!("SETEX failed: {err}")))
    }

    async fn invalidate(&self, patterns: &[String], verb: Option<&str>) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;

        for pattern in patterns {
            let full = Self::full_pattern(pattern, verb);
            let purged = purge_pattern(&mut conn, &full, self.scan_batch_size).await?;
            debug!(pattern = %full, purged, "cache invalidated (redis)");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays a fixed sequence of SCAN replies and records what the walk
    /// asked for.
    struct ScriptedScan {
        pages: VecDeque<(u64, Vec<&'static str>)>,
        cursors_seen: Vec<u64>,
        deleted: Vec<String>,
    }

    impl ScriptedScan {
        fn new(pages: Vec<(u64, Vec<&'static str>)>) -> Self {
            Self {
                pages: pages.into(),
                cursors_seen: Vec::new(),
                deleted: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ScanBackend for ScriptedScan {
        async fn scan_page(
            &mut self,
            cursor: u64,
            _pattern: &str,
            _count: usize,
        ) -> Result<(u64, Vec<String>), CacheError> {
            self.cursors_seen.push(cursor);
            let (next, keys) = self
                .pages
                .pop_front()
                .expect("walk continued past the scripted sentinel");
            Ok((next, keys.into_iter().map(String::from).collect()))
        }

        async fn delete(&mut self, keys: Vec<String>) -> Result<(), CacheError> {
            self.deleted.extend(keys);
            Ok(())
        }
    }

    #[tokio::test]
    async fn purge_follows_cursors_to_the_sentinel() {
        let mut backend = ScriptedScan::new(vec![
            (17, vec!["GET:/orders?page=1:list", "GET:/orders?page=2:list"]),
            (42, vec![]),
            (0, vec!["POST:/orders?:count"]),
        ]);

        let purged = purge_pattern(&mut backend, "*:/orders*", 100)
            .await
            .expect("purge");

        assert_eq!(purged, 3);
        assert_eq!(backend.cursors_seen, vec![0, 17, 42]);
        assert_eq!(
            backend.deleted,
            vec![
                "GET:/orders?page=1:list",
                "GET:/orders?page=2:list",
                "POST:/orders?:count"
            ]
        );
    }

    #[tokio::test]
    async fn purge_stops_at_a_single_sentinel_page() {
        let mut backend = ScriptedScan::new(vec![(0, vec!["GET:/users?:list"])]);

        let purged = purge_pattern(&mut backend, "*:/users*", 100)
            .await
            .expect("purge");

        assert_eq!(purged, 1);
        assert_eq!(backend.cursors_seen, vec![0]);
    }

    #[tokio::test]
    async fn an_empty_sentinel_page_issues_no_delete() {
        let mut backend = ScriptedScan::new(vec![(9, vec!["a"]), (0, vec![])]);

        let purged = purge_pattern(&mut backend, "*:/stats*", 100)
            .await
            .expect("purge");

        assert_eq!(purged, 1);
        assert_eq!(backend.deleted, vec!["a"]);
    }

    #[test]
    fn verb_agnostic_patterns_glob_the_method_position() {
        assert_eq!(RedisCache::full_pattern("/orders*", None), "*:/orders*");
    }

    #[test]
    fn verb_scoped_patterns_pin_the_method() {
        assert_eq!(
            RedisCache::full_pattern("/users/42*", Some("GET")),
            "GET:/users/42*"
        );
    }
}
