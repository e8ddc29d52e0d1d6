//! In-memory repository fakes for exercising the cached services without a
//! database. Load counters expose whether a read hit the repository or was
//! served from the cache.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use opsboard::application::pagination::{PageRequest, PageResult};
use opsboard::application::repos::{
    CreateCustomer, CreateOrder, CustomerFilter, CustomersRepo, OrderFilter, OrdersRepo,
    RepoError, StatsRepo, UpdateCustomer, UpdateOrder,
};
use opsboard::domain::entities::{
    CustomerRecord, MonthlyRevenue, OrderRecord, OrderWithCustomer, StatusBucket,
};
use opsboard::domain::types::{OrderStatus, PaymentStatus};
use time::OffsetDateTime;
use uuid::Uuid;

pub fn customer(n: u32) -> CustomerRecord {
    let now = OffsetDateTime::now_utc();
    CustomerRecord {
        customer_id: Uuid::new_v4(),
        first_name: format!("First{n}"),
        last_name: format!("Last{n:03}"),
        email: format!("customer{n:03}@example.com"),
        phone_number: format!("555-{n:04}"),
        shipping_address: "1 Main St".into(),
        shipping_city: "Springfield".into(),
        shipping_state: "IL".into(),
        shipping_zip: "62701".into(),
        billing_address: "1 Main St".into(),
        billing_city: "Springfield".into(),
        billing_state: "IL".into(),
        billing_zip: "62701".into(),
        notes: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

pub fn order(customer_id: Uuid, cost: f64) -> OrderRecord {
    let now = OffsetDateTime::now_utc();
    OrderRecord {
        order_id: Uuid::new_v4(),
        order_date: now,
        order_description: "widgets".into(),
        customer_cost: cost,
        input_expenses: None,
        taxes_fees: None,
        shipping_cost: None,
        total_write_off: None,
        profit: None,
        notes: None,
        order_status: OrderStatus::Pending,
        payment_status: PaymentStatus::NotPaid,
        customer_id,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

#[derive(Default)]
pub struct FakeCustomersRepo {
    pub customers: Mutex<Vec<CustomerRecord>>,
    pub list_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
}

impl FakeCustomersRepo {
    pub fn seeded(customers: Vec<CustomerRecord>) -> Self {
        Self {
            customers: Mutex::new(customers),
            ..Self::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn live(&self) -> Vec<CustomerRecord> {
        self.customers
            .lock()
            .expect("fake repo lock")
            .iter()
            .filter(|c| c.deleted_at.is_none())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CustomersRepo for FakeCustomersRepo {
    async fn list(
        &self,
        filter: &CustomerFilter,
        request: &PageRequest,
    ) -> Result<PageResult<CustomerRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let mut rows = self.live();
        if let Some(prefix) = &filter.email {
            let prefix = prefix.to_lowercase();
            rows.retain(|c| c.email.to_lowercase().starts_with(&prefix));
        }
        if let Some(prefix) = &filter.last_name {
            let prefix = prefix.to_lowercase();
            rows.retain(|c| c.last_name.to_lowercase().starts_with(&prefix));
        }
        rows.sort_by(|a, b| a.last_name.cmp(&b.last_name));

        let total = rows.len() as u64;
        let items: Vec<_> = rows
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Ok(PageResult::assemble(items, total, request))
    }

    async fn find(&self, customer_id: Uuid) -> Result<CustomerRecord, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.live()
            .into_iter()
            .find(|c| c.customer_id == customer_id)
            .ok_or(RepoError::NotFound)
    }

    async fn create(&self, params: CreateCustomer) -> Result<CustomerRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = CustomerRecord {
            customer_id: Uuid::new_v4(),
            first_name: params.first_name,
            last_name: params.last_name,
            email: params.email,
            phone_number: params.phone_number,
            shipping_address: params.shipping_address,
            shipping_city: params.shipping_city,
            shipping_state: params.shipping_state,
            shipping_zip: params.shipping_zip,
            billing_address: params.billing_address,
            billing_city: params.billing_city,
            billing_state: params.billing_state,
            billing_zip: params.billing_zip,
            notes: params.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.customers
            .lock()
            .expect("fake repo lock")
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        customer_id: Uuid,
        params: UpdateCustomer,
    ) -> Result<CustomerRecord, RepoError> {
        let mut customers = self.customers.lock().expect("fake repo lock");
        let record = customers
            .iter_mut()
            .find(|c| c.customer_id == customer_id && c.deleted_at.is_none())
            .ok_or(RepoError::NotFound)?;
        record.first_name = params.first_name;
        record.last_name = params.last_name;
        record.email = params.email;
        record.phone_number = params.phone_number;
        record.notes = params.notes;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn soft_delete(&self, customer_id: Uuid) -> Result<(), RepoError> {
        let mut customers = self.customers.lock().expect("fake repo lock");
        let record = customers
            .iter_mut()
            .find(|c| c.customer_id == customer_id && c.deleted_at.is_none())
            .ok_or(RepoError::NotFound)?;
        record.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn hard_delete(&self, customer_id: Uuid) -> Result<(), RepoError> {
        let mut customers = self.customers.lock().expect("fake repo lock");
        let before = customers.len();
        customers.retain(|c| c.customer_id != customer_id);
        if customers.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn orders_for_customer(
        &self,
        _customer_id: Uuid,
    ) -> Result<Vec<OrderRecord>, RepoError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct FakeOrdersRepo {
    pub orders: Mutex<Vec<OrderRecord>>,
    pub list_calls: AtomicUsize,
}

impl FakeOrdersRepo {
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrdersRepo for FakeOrdersRepo {
    async fn list_with_customers(
        &self,
        _filter: &OrderFilter,
        request: &PageRequest,
    ) -> Result<PageResult<OrderWithCustomer>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let total = self
            .orders
            .lock()
            .expect("fake repo lock")
            .iter()
            .filter(|o| o.deleted_at.is_none())
            .count() as u64;
        Ok(PageResult::assemble(Vec::new(), total, request))
    }

    async fn find(&self, order_id: Uuid) -> Result<OrderRecord, RepoError> {
        self.orders
            .lock()
            .expect("fake repo lock")
            .iter()
            .find(|o| o.order_id == order_id && o.deleted_at.is_none())
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn create(&self, params: CreateOrder) -> Result<OrderRecord, RepoError> {
        let mut record = order(params.customer_id, params.customer_cost);
        record.order_date = params.order_date;
        record.order_description = params.order_description;
        record.order_status = params.order_status;
        record.payment_status = params.payment_status;
        self.orders
            .lock()
            .expect("fake repo lock")
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        order_id: Uuid,
        params: UpdateOrder,
    ) -> Result<OrderRecord, RepoError> {
        let mut orders = self.orders.lock().expect("fake repo lock");
        let record = orders
            .iter_mut()
            .find(|o| o.order_id == order_id && o.deleted_at.is_none())
            .ok_or(RepoError::NotFound)?;
        record.order_description = params.order_description;
        record.customer_cost = params.customer_cost;
        record.order_status = params.order_status;
        record.payment_status = params.payment_status;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn soft_delete(&self, order_id: Uuid) -> Result<(), RepoError> {
        let mut orders = self.orders.lock().expect("fake repo lock");
        let record = orders
            .iter_mut()
            .find(|o| o.order_id == order_id && o.deleted_at.is_none())
            .ok_or(RepoError::NotFound)?;
        record.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn hard_delete(&self, order_id: Uuid) -> Result<(), RepoError> {
        let mut orders = self.orders.lock().expect("fake repo lock");
        let before = orders.len();
        orders.retain(|o| o.order_id != order_id);
        if orders.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

/// Stats fake returning fixed aggregates; every call increments a counter so
/// tests can tell cached reads from recomputation.
#[derive(Default)]
pub struct FakeStatsRepo {
    pub calls: AtomicUsize,
}

impl FakeStatsRepo {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsRepo for FakeStatsRepo {
    async fn revenue(
        &self,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> Result<f64, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1500.0)
    }

    async fn order_count(
        &self,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> Result<u64, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(12)
    }

    async fn customer_count(
        &self,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> Result<u64, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(4)
    }

    async fn monthly_revenue(
        &self,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> Result<Vec<MonthlyRevenue>, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![MonthlyRevenue {
            year: 2024,
            month: 3,
            revenue: 1500.0,
        }])
    }

    async fn status_distribution(
        &self,
        _start: OffsetDateTime,
        _end: OffsetDateTime,
    ) -> Result<Vec<StatusBucket>, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![StatusBucket {
            year: 2024,
            month: 3,
            order_status: OrderStatus::Complete,
            count: 12,
        }])
    }
}
