//! Dashboard aggregate queries.
//!
//! All aggregates run over live rows of the requested `order_date` (or
//! `created_at` for customers) window. Each aggregate is one statement; the
//! service composes and caches them independently.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::application::repos::{RepoError, StatsRepo};
use crate::domain::entities::{MonthlyRevenue, StatusBucket};
use crate::domain::types::OrderStatus;

use super::util::{convert_count, map_sqlx_error};
use super::PostgresRepositories;

fn push_order_window(qb: &mut QueryBuilder<'_, Postgres>, start: OffsetDateTime, end: OffsetDateTime) {
    qb.push(" WHERE deleted_at IS NULL AND order_date >= ");
    qb.push_bind(start);
    qb.push(" AND order_date <= ");
    qb.push_bind(end);
}

#[async_trait]
impl StatsRepo for PostgresRepositories {
    async fn revenue(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<f64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(SUM(customer_cost), 0)::FLOAT8 FROM orders",
        );
        push_order_window(&mut qb, start, end);

        qb.build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn order_count(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_order_window(&mut qb, start, end);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }

    async fn customer_count(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM customers WHERE deleted_at IS NULL AND created_at >= ",
        );
        qb.push_bind(start);
        qb.push(" AND created_at <= ");
        qb.push_bind(end);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }

    async fn monthly_revenue(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<MonthlyRevenue>, RepoError> {
        #[derive(sqlx::FromRow)]
        struct MonthRow {
            year: i32,
            month: i32,
            revenue: f64,
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT CAST(EXTRACT(YEAR FROM order_date) AS INT4) AS year, \
                    CAST(EXTRACT(MONTH FROM order_date) AS INT4) AS month, \
                    COALESCE(SUM(customer_cost), 0)::FLOAT8 AS revenue \
             FROM orders",
        );
        push_order_window(&mut qb, start, end);
        qb.push(" GROUP BY year, month ORDER BY year ASC, month ASC");

        let rows = qb
            .build_query_as::<MonthRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| MonthlyRevenue {
                year: row.year,
                month: row.month,
                revenue: row.revenue,
            })
            .collect())
    }

    async fn status_distribution(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<StatusBucket>, RepoError> {
        #[derive(sqlx::FromRow)]
        struct StatusRow {
            year: i32,
            month: i32,
            order_status: OrderStatus,
            count: i64,
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT CAST(EXTRACT(YEAR FROM order_date) AS INT4) AS year, \
                    CAST(EXTRACT(MONTH FROM order_date) AS INT4) AS month, \
                    order_status, \
                    COUNT(*) AS count \
             FROM orders",
        );
        push_order_window(&mut qb, start, end);
        qb.push(" GROUP BY year, month, order_status ORDER BY year ASC, month ASC");

        let rows = qb
            .build_query_as::<StatusRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut buckets = Vec::with_capacity(rows.len());
        for row in rows {
            buckets.push(StatusBucket {
                year: row.year,
                month: row.month,
                order_status: row.order_status,
                count: convert_count(row.count)?,
            });
        }
        Ok(buckets)
    }
}
