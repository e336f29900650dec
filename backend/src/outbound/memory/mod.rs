//! Process-local identity store used when no database is configured.

mod identity_store;

pub use identity_store::InMemoryIdentityStore;
