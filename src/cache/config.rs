//! Cache configuration.

use std::time::Duration;

use serde::Deserialize;

// One week. Invalidation-on-write is the primary consistency mechanism; the
// TTL only bounds staleness after a missed invalidation.
const DEFAULT_TTL_SECONDS: u64 = 604_800;
const DEFAULT_SCAN_BATCH_SIZE: usize = 100;

/// Which [`super::CacheStore`] implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    Memory,
    Redis,
}

/// Cache configuration from `opsboard.toml` / environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disables all caching when false; reads go straight to the database.
    pub enabled: bool,
    /// Backend selection for [`super::build_store`].
    pub backend: CacheBackendKind,
    /// Redis connection URL; required when `backend = "redis"`.
    pub redis_url: Option<String>,
    /// Default entry lifetime in seconds.
    pub ttl_seconds: u64,
    /// SCAN page size, which also bounds each DEL batch during invalidation.
    pub scan_batch_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackendKind::Memory,
            redis_url: None,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// SCAN batch size clamped to at least 1 so the cursor loop always advances.
    pub fn scan_batch_size_non_zero(&self) -> usize {
        self.scan_batch_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.backend, CacheBackendKind::Memory);
        assert_eq!(config.ttl_seconds, 604_800);
        assert_eq!(config.scan_batch_size, 100);
    }

    #[test]
    fn scan_batch_clamps_to_one() {
        let config = CacheConfig {
            scan_batch_size: 0,
            ..Default::default()
        };
        assert_eq!(config.scan_batch_size_non_zero(), 1);
    }

    #[test]
    fn ttl_converts_to_duration() {
        let config = CacheConfig {
            ttl_seconds: 60,
            ..Default::default()
        };
        assert_eq!(config.ttl(), Duration::from_secs(60));
    }
}
