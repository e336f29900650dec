//! Driving port for direct ledger account administration.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{AccountIdentifier, AccountSnapshot, BalanceOutOfRange, Error};

use super::profile_query::{balance_out_of_range_error, store_unavailable_error};
use super::LedgerStoreError;

/// Failures of the ledger-only operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerAccountError {
    #[error("ledger account {identifier} not found")]
    NotFound { identifier: AccountIdentifier },
    /// Lookup could not reach the engine.
    #[error("ledger engine unavailable: {message}")]
    StoreUnavailable { message: String },
    /// Creation failed for any reason, including engine rejection.
    #[error("ledger account {identifier} was not created: {cause}")]
    ProvisioningFailed {
        identifier: AccountIdentifier,
        cause: LedgerStoreError,
    },
    #[error(transparent)]
    BalanceOutOfRange(#[from] BalanceOutOfRange),
    #[error("ledger account request failed: {message}")]
    Internal { message: String },
}

impl From<LedgerAccountError> for Error {
    fn from(value: LedgerAccountError) -> Self {
        match value {
            LedgerAccountError::NotFound { identifier } => {
                Error::not_found(format!("ledger account {identifier} not found")).with_details(
                    json!({ "reason": "account_not_found", "identifier": identifier }),
                )
            }
            LedgerAccountError::StoreUnavailable { .. } => store_unavailable_error(),
            LedgerAccountError::ProvisioningFailed { identifier, cause } => {
                let reason = match &cause {
                    LedgerStoreError::Rejected { reason } => {
                        json!({
                            "reason": "ledger_rejected",
                            "identifier": identifier,
                            "ledgerResult": reason.to_string(),
                        })
                    }
                    _ => json!({
                        "reason": "account_provisioning_failed",
                        "identifier": identifier,
                    }),
                };
                Error::internal(format!("ledger account {identifier} was not created: {cause}"))
                    .with_details(reason)
            }
            LedgerAccountError::BalanceOutOfRange(err) => balance_out_of_range_error(&err),
            LedgerAccountError::Internal { message } => Error::internal(message)
                .with_details(json!({ "reason": "internal_error" })),
        }
    }
}

/// Use-case port for reading or creating a ledger account without an
/// identity step.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerAccounts: Send + Sync {
    /// Look up a single account.
    async fn get_account(
        &self,
        identifier: AccountIdentifier,
    ) -> Result<AccountSnapshot, LedgerAccountError>;

    /// Create a zero-balance account.
    async fn create_account(
        &self,
        identifier: AccountIdentifier,
    ) -> Result<AccountSnapshot, LedgerAccountError>;
}
