//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL identity store via Diesel
//! - **memory**: process-local identity store
//! - **ledger**: ledger engine over HTTP, or in memory
//!
//! Adapters translate between domain types and their store's representation
//! and carry no business rules.

pub mod ledger;
pub mod memory;
pub mod persistence;
