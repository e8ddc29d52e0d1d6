//! Customer listing and lifecycle with cached reads.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::application::pagination::{PageRequest, PageResult};
use crate::application::read_through::read_through;
use crate::application::repos::{
    CreateCustomer, CustomerFilter, CustomersRepo, RepoError, UpdateCustomer,
};
use crate::cache::{CacheStore, EntityKind, InvalidationPolicy, MutationKind};
use crate::domain::entities::{CustomerRecord, OrderRecord};

#[derive(Clone)]
pub struct CustomersService {
    repo: Arc<dyn CustomersRepo>,
    cache: Arc<dyn CacheStore>,
    policy: InvalidationPolicy,
    ttl: Duration,
}

impl CustomersService {
    pub fn new(
        repo: Arc<dyn CustomersRepo>,
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

    /// One filtered page of live customers, served from cache when fresh.
    pub async fn list(
        &self,
        cache_key: &str,
        filter: &CustomerFilter,
        request: &PageRequest,
    ) -> Result<PageResult<CustomerRecord>, RepoError> {
        read_through(self.cache.as_ref(), cache_key, self.ttl, || {
            self.repo.list(filter, request)
        })
        .await
    }

    pub async fn find(
        &self,
        cache_key: &str,
        customer_id: Uuid,
    ) -> Result<CustomerRecord, RepoError> {
        read_through(self.cache.as_ref(), cache_key, self.ttl, || {
            self.repo.find(customer_id)
        })
        .await
    }

    /// Live orders for one customer, newest first.
    pub async fn orders(
        &self,
        cache_key: &str,
        customer_id: Uuid,
    ) -> Result<Vec<OrderRecord>, RepoError> {
        read_through(self.cache.as_ref(), cache_key, self.ttl, || {
            self.repo.orders_for_customer(customer_id)
        })
        .await
    }

    // Invalidation fires after every mutation attempt, success or not.

    pub async fn create(&self, params: CreateCustomer) -> Result<CustomerRecord, RepoError> {
        let result = self.repo.create(params).await;
        self.policy
            .after_mutation(EntityKind::Customers, MutationKind::Create, None)
            .await;
        result
    }

    pub async fn update(
        &self,
        customer_id: Uuid,
        params: UpdateCustomer,
    ) -> Result<CustomerRecord, RepoError> {
        let result = self.repo.update(customer_id, params).await;
        self.policy
            .after_mutation(
                EntityKind::Customers,
                MutationKind::Update,
                Some(customer_id),
            )
            .await;
        result
    }

    pub async fn soft_delete(&self, customer_id: Uuid) -> Result<(), RepoError> {
        let result = self.repo.soft_delete(customer_id).await;
        self.policy
            .after_mutation(
                EntityKind::Customers,
                MutationKind::SoftDelete,
                Some(customer_id),
            )
            .await;
        result
    }

    pub async fn hard_delete(&self, customer_id: Uuid) -> Result<(), RepoError> {
        let result = self.repo.hard_delete(customer_id).await;
        self.policy
            .after_mutation(
                EntityKind::Customers,
                MutationKind::HardDelete,
                Some(customer_id),
            )
            .await;
        result
    }
}
