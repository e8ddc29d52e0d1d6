//! Order listing and lifecycle with cached reads.
//!
//! Order mutations purge the widest set of entries: order pages, every
//! customer detail (embedded order lists) and all stats aggregates.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::application::pagination::{PageRequest, PageResult};
use crate::application::read_through::read_through;
use crate::application::repos::{CreateOrder, OrderFilter, OrdersRepo, RepoError, UpdateOrder};
use crate::cache::{CacheStore, EntityKind, InvalidationPolicy, MutationKind};
use crate::domain::entities::{OrderRecord, OrderWithCustomer};

#[derive(Clone)]
pub struct OrdersService {
    repo: Arc<dyn OrdersRepo>,
    cache: Arc<dyn CacheStore>,
    policy: InvalidationPolicy,
    ttl: Duration,
}

impl OrdersService {
    pub fn new(
        repo: Arc<dyn OrdersRepo>,
        cache: Arc<dyn CacheStore>,
        policy: InvalidationPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            policy,
            ttl,
        }
    }

    /// One filtered page of live orders joined with their customers.
    pub async fn list(
        &self,
        cache_key: &str,
        filter: &OrderFilter,
        request: &PageRequest,
    ) -> Result<PageResult<OrderWithCustomer>, RepoError> {
        read_through(self.cache.as_ref(), cache_key, self.ttl, || {
            self.repo.list_with_customers(filter, request)
        })
        .await
    }

    pub async fn find(&self, cache_key: &str, order_id: Uuid) -> Result<OrderRecord, RepoError> {
        read_through(self.cache.as_ref(), cache_key, self.ttl, || {
            self.repo.find(order_id)
        })
        .await
    }

    pub async fn create(&self, params: CreateOrder) -> Result<OrderRecord, RepoError> {
        let result = self.repo.create(params).await;
        self.policy
            .after_mutation(EntityKind::Orders, MutationKind::Create, None)
            .await;
        result
    }

    pub async fn update(
        &self,
        order_id: Uuid,
        params: UpdateOrder,
    ) -> Result<OrderRecord, RepoError> {
        let result = self.repo.update(order_id, params).await;
        self.policy
            .after_mutation(EntityKind::Orders, MutationKind::Update, Some(order_id))
            .await;
        result
    }

    pub async fn soft_delete(&self, order_id: Uuid) -> Result<(), RepoError> {
        let result = self.repo.soft_delete(order_id).await;
        self.policy
            .after_mutation(EntityKind::Orders, MutationKind::SoftDelete, Some(order_id))
            .await;
        result
    }

    pub async fn hard_delete(&self, order_id: Uuid) -> Result<(), RepoError> {
        let result = self.repo.hard_delete(order_id).await;
        self.policy
            .after_mutation(EntityKind::Orders, MutationKind::HardDelete, Some(order_id))
            .await;
        result
    }
}
