use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, PageResult};
use crate::application::query::{FilterPredicate, ListQuery};
use crate::application::repos::{
    CreateCustomer, CustomerFilter, CustomersRepo, RepoError, UpdateCustomer,
};
use crate::domain::entities::{CustomerRecord, OrderRecord};

use super::util::map_sqlx_error;
use super::{PostgresRepositories, paginate::paginate};

const CUSTOMER_COLUMNS: &str = "customer_id, first_name, last_name, email, phone_number, \
     shipping_address, shipping_city, shipping_state, shipping_zip, \
     billing_address, billing_city, billing_state, billing_zip, \
     notes, created_at, updated_at, deleted_at";

const CUSTOMER_SORTABLE: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "phone_number",
    "created_at",
    "updated_at",
];

#[derive(sqlx::FromRow)]
struct CustomerRow {
    customer_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    shipping_address: String,
    shipping_city: String,
    shipping_state: String,
    shipping_zip: String,
    billing_address: String,
    billing_city: String,
    billing_state: String,
    billing_zip: String,
    notes: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    deleted_at: Option<OffsetDateTime>,
}

impl From<CustomerRow> for CustomerRecord {
    fn from(row: CustomerRow) -> Self {
        Self {
            customer_id: row.customer_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            shipping_address: row.shipping_address,
            shipping_city: row.shipping_city,
            shipping_state: row.shipping_state,
            shipping_zip: row.shipping_zip,
            billing_address: row.billing_address,
            billing_city: row.billing_city,
            billing_state: row.billing_state,
            billing_zip: row.billing_zip,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Customer listing descriptor: live rows only, prefix filters on the
/// identity columns and an inclusive `created_at` window.
pub(super) fn customer_list_query(filter: &CustomerFilter) -> Result<ListQuery, RepoError> {
    let mut query = ListQuery::new(
        "customers",
        CUSTOMER_COLUMNS,
        "customer_id",
        CUSTOMER_SORTABLE,
    )
    .filter(FilterPredicate::IsNull {
        column: "deleted_at",
    });

    for (column, value) in [
        ("email", &filter.email),
        ("phone_number", &filter.phone_number),
        ("first_name", &filter.first_name),
        ("last_name", &filter.last_name),
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
                column: "created_at",
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
impl CustomersRepo for PostgresRepositories {
    async fn list(
        &self,
        filter: &CustomerFilter,
        request: &PageRequest,
    ) -> Result<PageResult<CustomerRecord>, RepoError> {
        let query = customer_list_query(filter)?;
        let page = paginate::<CustomerRow>(self.pool(), &query, request).await?;
        Ok(page.map(CustomerRecord::from))
    }

    async fn find(&self, customer_id: Uuid) -> Result<CustomerRecord, RepoError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE customer_id = $1 AND deleted_at IS NULL"
        ))
        .bind(customer_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CustomerRecord::from(row))
    }

    async fn create(&self, params: CreateCustomer) -> Result<CustomerRecord, RepoError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "INSERT INTO customers ( \
                 customer_id, first_name, last_name, email, phone_number, \
                 shipping_address, shipping_city, shipping_state, shipping_zip, \
                 billing_address, billing_city, billing_state, billing_zip, notes \
             ) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.email)
        .bind(params.phone_number)
        .bind(params.shipping_address)
        .bind(params.shipping_city)
        .bind(params.shipping_state)
        .bind(params.shipping_zip)
        .bind(params.billing_address)
        .bind(params.billing_city)
        .bind(params.billing_state)
        .bind(params.billing_zip)
        .bind(params.notes)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CustomerRecord::from(row))
    }

    async fn update(
        &self,
        customer_id: Uuid,
        params: UpdateCustomer,
    ) -> Result<CustomerRecord, RepoError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "UPDATE customers \
             SET first_name = $2, last_name = $3, email = $4, phone_number = $5, \
                 shipping_address = $6, shipping_city = $7, shipping_state = $8, \
                 shipping_zip = $9, billing_address = $10, billing_city = $11, \
                 billing_state = $12, billing_zip = $13, notes = $14, \
                 updated_at = now() \
             WHERE customer_id = $1 AND deleted_at IS NULL \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer_id)
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.email)
        .bind(params.phone_number)
        .bind(params.shipping_address)
        .bind(params.shipping_city)
        .bind(params.shipping_state)
        .bind(params.shipping_zip)
        .bind(params.billing_address)
        .bind(params.billing_city)
        .bind(params.billing_state)
        .bind(params.billing_zip)
        .bind(params.notes)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CustomerRecord::from(row))
    }

    async fn soft_delete(&self, customer_id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE customers SET deleted_at = now(), updated_at = now() \
             WHERE customer_id = $1 AND deleted_at IS NULL",
        )
        .bind(customer_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn hard_delete(&self, customer_id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn orders_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<OrderRecord>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT order_id, order_date, order_description, customer_cost, \
                    input_expenses, taxes_fees, shipping_cost, total_write_off, \
                    profit, notes, order_status, payment_status, customer_id, \
                    created_at, updated_at, deleted_at \
             FROM orders WHERE deleted_at IS NULL AND customer_id = ",
        );
        qb.push_bind(customer_id);
        qb.push(" ORDER BY order_date DESC, order_id ASC");

        let rows = qb
            .build_query_as::<super::orders::OrderRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(OrderRecord::from).collect())
    }
}
