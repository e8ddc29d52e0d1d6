//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    #[serde(rename = "pending")]
    #[sqlx(rename = "pending")]
    Pending,
    #[serde(rename = "in progress")]
    #[sqlx(rename = "in progress")]
    InProgress,
    #[serde(rename = "complete")]
    #[sqlx(rename = "complete")]
    Complete,
    #[serde(rename = "canceled")]
    #[sqlx(rename = "canceled")]
    Canceled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in progress",
            OrderStatus::Complete => "complete",
            OrderStatus::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status")]
pub enum PaymentStatus {
    #[serde(rename = "not paid")]
    #[sqlx(rename = "not paid")]
    NotPaid,
    #[serde(rename = "partially paid")]
    #[sqlx(rename = "partially paid")]
    PartiallyPaid,
    #[serde(rename = "fully paid")]
    #[sqlx(rename = "fully paid")]
    FullyPaid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::NotPaid => "not paid",
            PaymentStatus::PartiallyPaid => "partially paid",
            PaymentStatus::FullyPaid => "fully paid",
        }
    }
}
