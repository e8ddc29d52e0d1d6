//! Application layer: pagination envelopes, the composable query descriptor,
//! repository traits, and the cached per-entity read services.

pub mod customers;
pub mod error;
pub mod orders;
pub mod pagination;
pub mod query;
pub(crate) mod read_through;
pub mod repos;
pub mod stats;
pub mod users;
