//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{LedgerAccounts, OrphanReconciliation, ProfileQuery, UserProvisioning};

/// Deadline applied when the caller does not configure one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameter object bundling the driving ports.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub provisioning: Arc<dyn UserProvisioning>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub accounts: Arc<dyn LedgerAccounts>,
    pub reconciliation: Arc<dyn OrphanReconciliation>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub provisioning: Arc<dyn UserProvisioning>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub accounts: Arc<dyn LedgerAccounts>,
    pub reconciliation: Arc<dyn OrphanReconciliation>,
    /// Upper bound on each read made by a handler; signup bounds each of
    /// its store steps by the same value.
    pub request_timeout: Duration,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, DEFAULT_REQUEST_TIMEOUT)
    }
}

impl HttpState {
    /// Bundle the ports with the per-call deadline.
    pub fn new(ports: HttpStatePorts, request_timeout: Duration) -> Self {
        let HttpStatePorts {
            provisioning,
            profiles,
            accounts,
            reconciliation,
        } = ports;
        Self {
            provisioning,
            profiles,
            accounts,
            reconciliation,
            request_timeout,
        }
    }
}
