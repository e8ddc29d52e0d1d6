//! opsboard cache system.
//!
//! The read path of every list and dashboard endpoint goes through one
//! key-value cache:
//!
//! - **keys** (`key`): deterministic derivation of a cache key from a read
//!   request's identity (verb, path, canonicalized query, discriminator).
//! - **store** (`store`, `redis`): a backend-agnostic [`CacheStore`] with an
//!   in-process TTL map and a Redis implementation, selected at construction.
//! - **policy** (`policy`): the static mutation → invalidation-pattern map
//!   executed after every write attempt.
//!
//! ## Configuration
//!
//! Behavior is controlled by `[cache]` in `opsboard.toml` / environment:
//!
//! ```toml
//! [cache]
//! backend = "memory"          # or "redis"
//! ttl_seconds = 604800
//! scan_batch_size = 100
//! ```

mod config;
mod key;
pub mod policy;
mod redis;
mod store;

pub use config::{CacheBackendKind, CacheConfig};
pub use key::{derive_key, sub_key};
pub use policy::{EntityKind, InvalidationPolicy, MutationKind};
pub use redis::RedisCache;
pub use store::{CacheError, CacheStore, MemoryCache, build_store};
