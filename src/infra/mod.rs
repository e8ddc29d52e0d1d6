//! Infrastructure: Postgres repositories and process telemetry.

pub mod db;
pub mod error;
pub mod telemetry;

pub use error::InfraError;
