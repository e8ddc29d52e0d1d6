//! opsboard: cached read core for an administrative storefront backend.
//!
//! The crate provides the subsystem every list and dashboard endpoint of the
//! surrounding HTTP layer leans on:
//!
//! - **`cache`**: cache-key derivation, a swappable key-value store
//!   (in-process TTL map or Redis) and the pattern-based invalidation policy
//!   executed after every mutation.
//! - **`application`**: pagination envelopes, the composable filter/query
//!   descriptor, repository traits, and the per-entity read-through services.
//! - **`infra`**: Postgres repository implementations and telemetry setup.
//! - **`config`**: immutable process settings built once at startup.
//!
//! Routing, authentication, and request validation live in the consuming
//! HTTP layer; this crate is addressed through plain call contracts
//! (normalized read descriptors plus a caller-derived cache key).

pub mod application;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
