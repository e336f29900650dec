//! PostgreSQL persistence for identities.
//!
//! Diesel row types and schema stay private to this module; the rest of the
//! crate sees [`DieselIdentityStore`] through the `IdentityStore` port.

mod diesel_identity_store;
mod identity_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_identity_store::DieselIdentityStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
