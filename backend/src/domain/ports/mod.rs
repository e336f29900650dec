//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`UserProvisioning`, `ProfileQuery`, `LedgerAccounts`,
//! `OrphanReconciliation`) are called by inbound adapters. Driven ports
//! (`IdentityStore`, `LedgerStore`) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_store;
mod ledger_accounts;
mod ledger_store;
mod orphan_reconciliation;
mod profile_query;
mod user_provisioning;

#[cfg(test)]
pub use identity_store::MockIdentityStore;
pub use identity_store::{IdentityStore, IdentityStoreError};
#[cfg(test)]
pub use ledger_accounts::MockLedgerAccounts;
pub use ledger_accounts::{LedgerAccountError, LedgerAccounts};
#[cfg(test)]
pub use ledger_store::MockLedgerStore;
pub use ledger_store::{LedgerRejection, LedgerStore, LedgerStoreError};
#[cfg(test)]
pub use orphan_reconciliation::MockOrphanReconciliation;
pub use orphan_reconciliation::{OrphanReconciliation, ReconciliationError};
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::{ProfileQuery, ProfileResolutionError};
pub(crate) use profile_query::store_unavailable_error;
#[cfg(test)]
pub use user_provisioning::MockUserProvisioning;
pub use user_provisioning::{ProvisioningError, UserProvisioning};
