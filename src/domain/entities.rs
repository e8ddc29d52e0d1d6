//! Domain entities mirrored from persistent storage.
//!
//! Records carry `Serialize`/`Deserialize` because cached list pages and
//! dashboard aggregates round-trip through the cache store as JSON text.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{OrderStatus, PaymentStatus};

/// Administrative account. The password hash never leaves the repository
/// layer; cached user payloads must not carry credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: Uuid,
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
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: Uuid,
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
    pub customer_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

/// Flattened join row served by the orders-with-customers listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithCustomer {
    pub order_id: Uuid,
    pub order_date: OffsetDateTime,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub order_created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub customer_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub customer_created_at: OffsetDateTime,
    pub customer_updated_at: OffsetDateTime,
}

/// One `(year, month)` revenue bucket of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: i32,
    pub revenue: f64,
}

/// One `(year, month, status)` bucket of the order status distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBucket {
    pub year: i32,
    pub month: i32,
    pub order_status: OrderStatus,
    pub count: u64,
}

/// Composed dashboard payload.
///
/// Sub-aggregates are cached and recomputed independently, so two fields may
/// reflect database states captured at slightly different instants when an
/// entry expires between sub-queries. Tolerated for dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub revenue: f64,
    pub order_count: u64,
    pub customer_count: u64,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub status_distribution: Vec<StatusBucket>,
}
