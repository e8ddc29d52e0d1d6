//! Repository traits and the parameter/error types they share.
//!
//! Services depend on these traits only; Postgres implementations live under
//! `infra::db` and test doubles under `tests/support`.

use async_trait::async_trait;
use time::{Date, Month, OffsetDateTime};
use uuid::Uuid;

use crate::application::pagination::{PageRequest, PageResult, PaginationError};
use crate::domain::entities::{
    CustomerRecord, MonthlyRevenue, OrderRecord, OrderWithCustomer, StatusBucket, UserRecord,
};
use crate::domain::types::{OrderStatus, PaymentStatus};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("duplicate value for constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("record not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error("operation timed out")]
    Timeout,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// Optional prefix/range filters for customer listings. Every field is
/// conjunctive; `None` means "no constraint on this column".
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
}

/// Date window for the stats queries.
///
/// Both bounds must be present or both absent; a half-open range is a caller
/// error. When absent the window defaults to the start of the current
/// calendar year through now.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsRange {
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
}

impl StatsRange {
    pub fn bounds(&self) -> Result<(OffsetDateTime, OffsetDateTime), RepoError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok((start, end)),
            (None, None) => {
                let now = OffsetDateTime::now_utc();
                let year_start = Date::from_calendar_date(now.year(), Month::January, 1)
                    .map_err(|e| RepoError::InvalidInput(e.to_string()))?
                    .midnight()
                    .assume_utc();
                Ok((year_start, now))
            }
            _ => Err(RepoError::InvalidInput(
                "startDate and endDate must be provided together".into(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_zip: String,
    pub notes: Option<String>,
}

/// Full-replacement update; absent optional columns are written as NULL,
/// matching the form-submit semantics of the admin surface.
#[derive(Debug, Clone)]
pub struct UpdateCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_zip: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub customer_id: Uuid,
    pub order_date: OffsetDateTime,
    pub order_description: String,
    pub customer_cost: f64,
    pub input_expenses: Option<f64>,
    pub taxes_fees: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub total_write_off: Option<f64>,
    pub profit: Option<f64>,
    pub notes: Option<String>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone)]
pub struct UpdateOrder {
    pub order_date: OffsetDateTime,
    pub order_description: String,
    pub customer_cost: f64,
    pub input_expenses: Option<f64>,
    pub taxes_fees: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub total_write_off: Option<f64>,
    pub profit: Option<f64>,
    pub notes: Option<String>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub user_name: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub user_name: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub last_login: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub enum UserLookup {
    ById(Uuid),
    ByUserName(String),
}

#[async_trait]
pub trait CustomersRepo: Send + Sync {
    async fn list(
        &self,
        filter: &CustomerFilter,
        request: &PageRequest,
    ) -> Result<PageResult<CustomerRecord>, RepoError>;

    async fn find(&self, customer_id: Uuid) -> Result<CustomerRecord, RepoError>;

    async fn create(&self, params: CreateCustomer) -> Result<CustomerRecord, RepoError>;

    async fn update(
        &self,
        customer_id: Uuid,
        params: UpdateCustomer,
    ) -> Result<CustomerRecord, RepoError>;

    async fn soft_delete(&self, customer_id: Uuid) -> Result<(), RepoError>;

    async fn hard_delete(&self, customer_id: Uuid) -> Result<(), RepoError>;

    /// All live orders belonging to one customer, newest first.
    async fn orders_for_customer(&self, customer_id: Uuid)
        -> Result<Vec<OrderRecord>, RepoError>;
}

#[async_trait]
pub trait OrdersRepo: Send + Sync {
    async fn list_with_customers(
        &self,
        filter: &OrderFilter,
        request: &PageRequest,
    ) -> Result<PageResult<OrderWithCustomer>, RepoError>;

    async fn find(&self, order_id: Uuid) -> Result<OrderRecord, RepoError>;

    async fn create(&self, params: CreateOrder) -> Result<OrderRecord, RepoError>;

    async fn update(&self, order_id: Uuid, params: UpdateOrder)
        -> Result<OrderRecord, RepoError>;

    async fn soft_delete(&self, order_id: Uuid) -> Result<(), RepoError>;

    async fn hard_delete(&self, order_id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find(&self, lookup: &UserLookup) -> Result<UserRecord, RepoError>;

    async fn list(&self, request: &PageRequest) -> Result<PageResult<UserRecord>, RepoError>;

    async fn create(&self, params: CreateUser) -> Result<UserRecord, RepoError>;

    async fn update(&self, user_id: Uuid, params: UpdateUser)
        -> Result<UserRecord, RepoError>;

    async fn hard_delete(&self, user_id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait StatsRepo: Send + Sync {
    async fn revenue(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<f64, RepoError>;

    async fn order_count(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<u64, RepoError>;

    async fn customer_count(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<u64, RepoError>;

    async fn monthly_revenue(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<MonthlyRevenue>, RepoError>;

    async fn status_distribution(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<StatusBucket>, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn explicit_bounds_pass_through() {
        let range = StatsRange {
            start_date: Some(datetime!(2024-03-01 00:00 UTC)),
            end_date: Some(datetime!(2024-03-31 00:00 UTC)),
        };
        let (start, end) = range.bounds().expect("full range");
        assert_eq!(start, datetime!(2024-03-01 00:00 UTC));
        assert_eq!(end, datetime!(2024-03-31 00:00 UTC));
    }

    #[test]
    fn absent_bounds_default_to_current_year() {
        let (start, end) = StatsRange::default().bounds().expect("default range");
        let now = OffsetDateTime::now_utc();
        assert_eq!(start.year(), now.year());
        assert_eq!(start.month(), Month::January);
        assert_eq!(start.day(), 1);
        assert!(end <= OffsetDateTime::now_utc());
        assert!(end >= start);
    }

    #[test]
    fn half_open_range_is_rejected() {
        let range = StatsRange {
            start_date: Some(datetime!(2024-03-01 00:00 UTC)),
            end_date: None,
        };
        assert!(matches!(range.bounds(), Err(RepoError::InvalidInput(_))));
    }
}
