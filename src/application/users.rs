//! User account reads and lifecycle.
//!
//! `UserRecord` deliberately carries no password hash, so cached user
//! payloads never contain credential material. Credential checks go straight
//! to the repository, bypassing the cache entirely.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::application::pagination::{PageRequest, PageResult};
use crate::application::read_through::read_through;
use crate::application::repos::{CreateUser, RepoError, UpdateUser, UserLookup, UsersRepo};
use crate::cache::{CacheStore, EntityKind, InvalidationPolicy, MutationKind};
use crate::domain::entities::UserRecord;

#[derive(Clone)]
pub struct UsersService {
    repo: Arc<dyn UsersRepo>,
    cache: Arc<dyn CacheStore>,
    policy: InvalidationPolicy,
    ttl: Duration,
}

impl UsersService {
    pub fn new(
        repo: Arc<dyn UsersRepo>,
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

    pub async fn find(
        &self,
        cache_key: &str,
        lookup: &UserLookup,
    ) -> Result<UserRecord, RepoError> {
        read_through(self.cache.as_ref(), cache_key, self.ttl, || {
            self.repo.find(lookup)
        })
        .await
    }

    pub async fn list(
        &self,
        cache_key: &str,
        request: &PageRequest,
    ) -> Result<PageResult<UserRecord>, RepoError> {
        read_through(self.cache.as_ref(), cache_key, self.ttl, || {
            self.repo.list(request)
        })
        .await
    }

    pub async fn create(&self, params: CreateUser) -> Result<UserRecord, RepoError> {
        let result = self.repo.create(params).await;
        self.policy
            .after_mutation(EntityKind::Users, MutationKind::Create, None)
            .await;
        result
    }

    pub async fn update(&self, user_id: Uuid, params: UpdateUser) -> Result<UserRecord, RepoError> {
        let result = self.repo.update(user_id, params).await;
        self.policy
            .after_mutation(EntityKind::Users, MutationKind::Update, Some(user_id))
            .await;
        result
    }

    pub async fn hard_delete(&self, user_id: Uuid) -> Result<(), RepoError> {
        let result = self.repo.hard_delete(user_id).await;
        self.policy
            .after_mutation(EntityKind::Users, MutationKind::HardDelete, Some(user_id))
            .await;
        result
    }
}
