//! Mutation → invalidation-pattern policy.
//!
//! Every write purges, by pattern, all cached reads its entity can affect.
//! The mapping is intentionally static and coarse: order mutations reach the
//! customer-with-orders views and every dashboard aggregate, so all three
//! families are purged. Patterns are verb-agnostic; both key derivation and
//! pattern construction must stay on that convention or reads and
//! invalidations silently stop matching each other.

use std::sync::Arc;

use metrics::counter;
use tracing::warn;
use uuid::Uuid;

use super::store::{CacheError, CacheStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Users,
    Customers,
    Orders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    SoftDelete,
    HardDelete,
}

/// Executes the static invalidation mapping against the cache store.
#[derive(Clone)]
pub struct InvalidationPolicy {
    store: Arc<dyn CacheStore>,
}

impl InvalidationPolicy {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Patterns purged for one mutation.
    ///
    /// `entity_id` narrows user updates to the by-id route family on top of
    /// the collection-wide pattern.
    pub fn patterns_for(
        entity: EntityKind,
        mutation: MutationKind,
        entity_id: Option<Uuid>,
    ) -> Vec<String> {
        match entity {
            EntityKind::Orders => vec![
                "/orders*".to_string(),
                "/customers/*".to_string(),
                "/stats*".to_string(),
            ],
            EntityKind::Customers => vec!["/customers*".to_string()],
            EntityKind::Users => {
                let mut patterns = vec!["/users*".to_string()];
                if mutation == MutationKind::Update {
                    if let Some(id) = entity_id {
                        patterns.push(format!("/users/{id}*"));
                    }
                }
                patterns
            }
        }
    }

    /// Run invalidation after a mutation attempt.
    ///
    /// Called on the write path whether the mutation succeeded or failed, so
    /// a failed write can never keep serving a cache entry populated before
    /// the attempt. Best-effort: a failure is retried once, then logged and
    /// counted; the entry TTL bounds the resulting staleness window.
    pub async fn after_mutation(
        &self,
        entity: EntityKind,
        mutation: MutationKind,
        entity_id: Option<Uuid>,
    ) {
        let patterns = Self::patterns_for(entity, mutation, entity_id);

        let first = self.store.invalidate(&patterns, None).await;
        let Err(err) = first else {
            return;
        };

        warn!(
            error = %err,
            ?entity,
            ?mutation,
            "cache invalidation failed, retrying once"
        );

        if let Err(err) = self.store.invalidate(&patterns, None).await {
            counter!("opsboard_cache_invalidation_failure_total").increment(1);
            warn!(
                error = %err,
                ?entity,
                ?mutation,
                patterns = ?patterns,
                "cache invalidation failed after retry; stale entries persist until TTL"
            );
        }
    }
}
