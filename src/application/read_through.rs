//! The read-through primitive every cached read goes through.
//!
//! The cache is strictly best-effort: a backend failure or a payload that no
//! longer deserializes is logged and treated as a miss, and a failed
//! write-back never fails the request. Only the loader's own error reaches
//! the caller.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::application::repos::RepoError;
use crate::cache::CacheStore;

pub(crate) async fn read_through<T, F, Fut>(
    cache: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<T, RepoError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, RepoError>>,
{
    match cache.get(key).await {
        Ok(Some(payload)) => match serde_json::from_str::<T>(&payload) {
            Ok(value) => {
                metrics::counter!("opsboard_cache_hit_total").increment(1);
                return Ok(value);
            }
            Err(error) => {
                warn!(%key, %error, "cached payload no longer deserializes, reloading");
            }
        },
        Ok(None) => {}
        Err(error) => {
            warn!(%key, %error, "cache read failed, falling through to the source");
        }
    }

    metrics::counter!("opsboard_cache_miss_total").increment(1);
    let value = load().await?;

    match serde_json::to_string(&value) {
        Ok(payload) => {
            if let Err(error) = cache.set(key, &payload, ttl).await {
                warn!(%key, %error, "cache write-back failed, serving uncached");
            }
        }
        Err(error) => {
            warn!(%key, %error, "value not serializable for caching");
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn miss_loads_and_populates() {
        let cache = MemoryCache::new();

        let value = read_through(&cache, "GET:/k?:t", TTL, || async { Ok(41_u32) })
            .await
            .expect("loader succeeds");
        assert_eq!(value, 41);
        assert_eq!(
            cache.get("GET:/k?:t").await.expect("backend up"),
            Some("41".to_owned())
        );
    }

    #[tokio::test]
    async fn hit_short_circuits_the_loader() {
        let cache = MemoryCache::new();
        cache.set("GET:/k?:t", "7", TTL).await.expect("seed");

        let value = read_through::<u32, _, _>(&cache, "GET:/k?:t", TTL, || async {
            panic!("loader must not run on a hit")
        })
        .await
        .expect("served from cache");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn corrupt_payload_falls_back_to_the_loader() {
        let cache = MemoryCache::new();
        cache.set("GET:/k?:t", "not-json{", TTL).await.expect("seed");

        let value = read_through(&cache, "GET:/k?:t", TTL, || async { Ok(9_u32) })
            .await
            .expect("reloaded");
        assert_eq!(value, 9);
        // The corrupt entry was replaced by the fresh payload.
        assert_eq!(
            cache.get("GET:/k?:t").await.expect("backend up"),
            Some("9".to_owned())
        );
    }

    #[tokio::test]
    async fn loader_errors_pass_through() {
        let cache = MemoryCache::new();

        let result = read_through::<u32, _, _>(&cache, "GET:/k?:t", TTL, || async {
            Err(RepoError::NotFound)
        })
        .await;
        assert!(matches!(result, Err(RepoError::NotFound)));
        assert_eq!(cache.get("GET:/k?:t").await.expect("backend up"), None);
    }
}
