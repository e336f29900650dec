//! Driving port for listing identities that lack a ledger account.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{Error, OrphanReport};

use super::profile_query::store_unavailable_error;

/// Failures while scanning for orphans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconciliationError {
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },
    #[error("reconciliation failed: {message}")]
    Internal { message: String },
}

impl From<ReconciliationError> for Error {
    fn from(value: ReconciliationError) -> Self {
        match value {
            ReconciliationError::StoreUnavailable { .. } => store_unavailable_error(),
            ReconciliationError::Internal { message } => Error::internal(message)
                .with_details(json!({ "reason": "internal_error" })),
        }
    }
}

/// Read-only operator capability; it never repairs what it finds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrphanReconciliation: Send + Sync {
    /// Report up to `limit` identities whose identifier has no ledger account.
    async fn find_orphans(&self, limit: usize) -> Result<OrphanReport, ReconciliationError>;
}
