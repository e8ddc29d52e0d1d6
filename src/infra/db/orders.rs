use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, PageResult};
use crate::application::query::{FilterPredicate, ListQuery};
use crate::application::repos::{CreateOrder, OrderFilter, OrdersRepo, RepoError, UpdateOrder};
use crate::domain::entities::{OrderRecord, OrderWithCustomer};
use crate::domain::types::{OrderStatus, PaymentStatus};

use super::util::map_sqlx_error;
use super::{PostgresRepositories, paginate::paginate};

const ORDER_COLUMNS: &str = "order_id, order_date, order_description, customer_cost, \
     input_expenses, taxes_fees, shipping_cost, total_write_off, profit, notes, \
     order_status, payment_status, customer_id, created_at, updated_at, deleted_at";

const ORDER_JOIN_FROM: &str = "orders o INNER JOIN customers c ON c.customer_id = o.customer_id";

const ORDER_JOIN_COLUMNS: &str = "o.order_id, o.order_date, o.order_status, o.payment_status, \
     o.created_at AS order_created_at, o.updated_at, \
     c.customer_id, c.first_name, c.last_name, c.email, c.phone_number, \
     c.created_at AS customer_created_at, c.updated_at AS customer_updated_at";

// Unqualified on purpose: each name resolves to exactly one side of the join,
// so they are valid in ORDER BY without aliases leaking into the API.
const ORDER_JOIN_SORTABLE: &[&str] = &[
    "order_date",
    "order_status",
    "payment_status",
    "first_name",
    "last_name",
    "email",
];

#[derive(sqlx::FromRow)]
pub(super) struct OrderRow {
    order_id: Uuid,
    order_date: OffsetDateTime,
    order_description: String,
    customer_cost: f64,
    input_expenses: Option<f64>,
    taxes_fees: Option<f64>,
    shipping_cost: Option<f64>,
    total_write_off: Option<f64>,
    profit: Option<f64>,
    notes: Option<String>,
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    customer_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    deleted_at: Option<OffsetDateTime>,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        Self {
            order_id: row.order_id,
            order_date: row.order_date,
            order_description: row.order_description,
            customer_cost: row.customer_cost,
            input_expenses: row.input_expenses,
            taxes_fees: row.taxes_fees,
            shipping_cost: row.shipping_cost,
            total_write_off: row.total_write_off,
            profit: row.profit,
            notes: row.notes,
            order_status: row.order_status,
            payment_status: row.payment_status,
            customer_id: row.customer_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderJoinRow {
    order_id: Uuid,
    order_date: OffsetDateTime,
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    order_created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    customer_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    customer_created_at: OffsetDateTime,
    customer_updated_at: OffsetDateTime,
}

impl From<OrderJoinRow> for OrderWithCustomer {
    fn from(row: OrderJoinRow) -> Self {
        Self {
            order_id: row.order_id,
            order_date: row.order_date,
            order_status: row.order_status,
            payment_status: row.payment_status,
            order_created_at: row.order_created_at,
            updated_at: row.updated_at,
            customer_id: row.customer_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            customer_created_at: row.customer_created_at,
            customer_updated_at: row.customer_updated_at,
        }
    }
}

/// Joined order listing: live orders of live customers, prefix filters on
/// the customer identity columns and an inclusive `order_date` window.
pub(super) fn order_list_query(filter: &OrderFilter) -> Result<ListQuery, RepoError> {
    let mut query = ListQuery::new(
        ORDER_JOIN_FROM,
        ORDER_JOIN_COLUMNS,
        "o.order_id",
        ORDER_JOIN_SORTABLE,
    )
    .filter(FilterPredicate::IsNull {
        column: "o.deleted_at",
    })
    .filter(FilterPredicate::IsNull {
        column: "c.deleted_at",
    });

    for (column, value) in [
        ("c.email", &filter.email),
        ("c.phone_number", &filter.phone_number),
        ("c.first_name", &filter.first_name),
        ("c.last_name", &filter.last_name),
    ] {
        if let Some(value) = value {
            query = query.filter(FilterPredicate::LikePrefix {
                column,
                value: value.clone(),
            });
        }
    }

    match (filter.start_date, filter.end_date) {
        (Some(start), Some(end)) => {
            query = query.filter(FilterPredicate::Between {
                column: "o.order_date",
                start,
                end,
            });
        }
        (None, None) => {}
        _ => {
            return Err(RepoError::InvalidInput(
                "startDate and endDate must be provided together".into(),
            ));
        }
    }

    Ok(query)
}

#[async_trait]
impl OrdersRepo for PostgresRepositories {
    async fn list_with_customers(
        &self,
        filter: &OrderFilter,
        request: &PageRequest,
    ) -> Result<PageResult<OrderWithCustomer>, RepoError> {
        let query = order_list_query(filter)?;
        let page = paginate::<OrderJoinRow>(self.pool(), &query, request).await?;
        Ok(page.map(OrderWithCustomer::from))
    }

    async fn find(&self, order_id: Uuid) -> Result<OrderRecord, RepoError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE order_id = $1 AND deleted_at IS NULL"
        ))
        .bind(order_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(OrderRecord::from(row))
    }

    async fn create(&self, params: CreateOrder) -> Result<OrderRecord, RepoError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders ( \
                 order_id, customer_id, order_date, order_description, customer_cost, \
                 input_expenses, taxes_fees, shipping_cost, total_write_off, profit, \
                 notes, order_status, payment_status \
             ) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.customer_id)
        .bind(params.order_date)
        .bind(params.order_description)
        .bind(params.customer_cost)
        .bind(params.input_expenses)
        .bind(params.taxes_fees)
        .bind(params.shipping_cost)
        .bind(params.total_write_off)
        .bind(params.profit)
        .bind(params.notes)
        .bind(params.order_status)
        .bind(params.payment_status)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(OrderRecord::from(row))
    }

    async fn update(
        &self,
        order_id: Uuid,
        params: UpdateOrder,
    ) -> Result<OrderRecord, RepoError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders \
             SET order_date = $2, order_description = $3, customer_cost = $4, \
                 input_expenses = $5, taxes_fees = $6, shipping_cost = $7, \
                 total_write_off = $8, profit = $9, notes = $10, \
                 order_status = $11, payment_status = $12, updated_at = now() \
             WHERE order_id = $1 AND deleted_at IS NULL \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .bind(params.order_date)
        .bind(params.order_description)
        .bind(params.customer_cost)
        .bind(params.input_expenses)
        .bind(params.taxes_fees)
        .bind(params.shipping_cost)
        .bind(params.total_write_off)
        .bind(params.profit)
        .bind(params.notes)
        .bind(params.order_status)
        .bind(params.payment_status)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(OrderRecord::from(row))
    }

    async fn soft_delete(&self, order_id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE orders SET deleted_at = now(), updated_at = now() \
             WHERE order_id = $1 AND deleted_at IS NULL",
        )
        .bind(order_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn hard_delete(&self, order_id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(order_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
