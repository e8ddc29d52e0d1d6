//! Startup wiring: settings → pool, cache store, policy and services.

use std::sync::Arc;

use tracing::info;

use crate::application::customers::CustomersService;
use crate::application::error::AppError;
use crate::application::orders::OrdersService;
use crate::application::stats::StatsService;
use crate::application::users::UsersService;
use crate::cache::{InvalidationPolicy, build_store};
use crate::config::Settings;
use crate::infra::InfraError;
use crate::infra::db::PostgresRepositories;
use crate::infra::telemetry;

/// The assembled application: one handle per service plus the shared
/// repositories for health checks.
#[derive(Clone)]
pub struct Services {
    pub customers: CustomersService,
    pub orders: OrdersService,
    pub users: UsersService,
    pub stats: StatsService,
    pub repositories: PostgresRepositories,
}

/// Install telemetry, connect the database, run migrations and assemble the
/// services.
pub async fn init(settings: &Settings) -> Result<Services, AppError> {
    telemetry::init(&settings.logging)?;

    let url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database.url is not configured"))?;

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    let repositories = PostgresRepositories::new(pool);
    let services = build_services(repositories, settings)?;

    info!(
        backend = ?settings.cache.backend,
        cache_enabled = settings.cache.enabled,
        "opsboard services initialized"
    );

    Ok(services)
}

/// Assemble the services over an already-connected repository handle.
pub fn build_services(
    repositories: PostgresRepositories,
    settings: &Settings,
) -> Result<Services, AppError> {
    let store = build_store(&settings.cache)?;
    let policy = InvalidationPolicy::new(Arc::clone(&store));
    let ttl = settings.cache.ttl();

    Ok(Services {
        customers: CustomersService::new(
            Arc::new(repositories.clone()),
            Arc::clone(&store),
            policy.clone(),
            ttl,
        ),
        orders: OrdersService::new(
            Arc::new(repositories.clone()),
            Arc::clone(&store),
            policy.clone(),
            ttl,
        ),
        users: UsersService::new(
            Arc::new(repositories.clone()),
            Arc::clone(&store),
            policy,
            ttl,
        ),
        stats: StatsService::new(Arc::new(repositories.clone()), store, ttl),
        repositories,
    })
}
