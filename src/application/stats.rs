//! Dashboard aggregates over the orders and customers tables.
//!
//! The dashboard payload is cached twice over: the assembled
//! [`DashboardStats`] under the caller's key, and each sub-aggregate under a
//! derived sub-key. After an order mutation purges `/stats*`, a dashboard
//! rebuild can still reuse any sub-aggregate another range query populated.
//! The sub-aggregates are separate statements, not one snapshot, so a write
//! landing mid-rebuild can skew them against each other; the dashboard is an
//! operator overview and tolerates that.

use std::sync::Arc;
use std::time::Duration;

use crate::application::read_through::read_through;
use crate::application::repos::{RepoError, StatsRange, StatsRepo};
use crate::cache::{CacheStore, sub_key};
use crate::domain::entities::DashboardStats;

#[derive(Clone)]
pub struct StatsService {
    repo: Arc<dyn StatsRepo>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl StatsService {
    pub fn new(repo: Arc<dyn StatsRepo>, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { repo, cache, ttl }
    }

    /// Assemble the full dashboard for one date window.
    ///
    /// An absent window defaults to the start of the current calendar year
    /// through now; a half-open window is rejected.
    pub async fn dashboard(
        &self,
        cache_key: &str,
        range: &StatsRange,
    ) -> Result<DashboardStats, RepoError> {
        let (start, end) = range.bounds()?;
        let cache = self.cache.as_ref();
        let ttl = self.ttl;

        read_through(cache, cache_key, ttl, || async move {
            let revenue = read_through(cache, &sub_key(cache_key, "revenue"), ttl, || {
                self.repo.revenue(start, end)
            })
            .await?;

            let order_count =
                read_through(cache, &sub_key(cache_key, "order-count"), ttl, || {
                    self.repo.order_count(start, end)
                })
                .await?;

            let customer_count =
                read_through(cache, &sub_key(cache_key, "customer-count"), ttl, || {
                    self.repo.customer_count(start, end)
                })
                .await?;

            let monthly_revenue =
                read_through(cache, &sub_key(cache_key, "monthly-revenue"), ttl, || {
                    self.repo.monthly_revenue(start, end)
                })
                .await?;

            let status_distribution =
                read_through(cache, &sub_key(cache_key, "status-distribution"), ttl, || {
                    self.repo.status_distribution(start, end)
                })
                .await?;

            Ok(DashboardStats {
                revenue,
                order_count,
                customer_count,
                monthly_revenue,
                status_distribution,
            })
        })
        .await
    }
}
