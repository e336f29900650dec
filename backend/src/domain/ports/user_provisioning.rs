//! Driving port for provisioning a user identity and its ledger account.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{AccountIdentifier, Error, SignupCredentials, UserProfile};

use super::LedgerStoreError;

/// Terminal failures of the provisioning sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisioningError {
    /// The username is already taken; no ledger call was made.
    #[error("user {username} already exists")]
    UserAlreadyExists { username: String },
    /// The identity store could not be reached; nothing was written.
    #[error("identity store unavailable: {message}")]
    IdentityStoreUnavailable { message: String },
    /// The identity was stored but its ledger account was not created.
    ///
    /// The identity is left in place without a ledger account.
    #[error("ledger account {identifier} for {username} was not created: {cause}")]
    AccountProvisioningFailed {
        username: String,
        identifier: AccountIdentifier,
        cause: LedgerStoreError,
    },
    /// Credential derivation or an unexpected store fault.
    #[error("provisioning failed: {message}")]
    Internal { message: String },
}

impl From<ProvisioningError> for Error {
    fn from(value: ProvisioningError) -> Self {
        match value {
            ProvisioningError::UserAlreadyExists { username } => {
                Error::conflict(format!("user {username} already exists")).with_details(json!({
                    "reason": "user_already_exists",
                    "username": username,
                }))
            }
            ProvisioningError::IdentityStoreUnavailable { .. } => {
                Error::service_unavailable("identity store is unavailable")
                    .with_details(json!({ "reason": "identity_store_unavailable" }))
            }
            ProvisioningError::AccountProvisioningFailed {
                username,
                identifier,
                cause,
            } => Error::internal(format!(
                "ledger account {identifier} for {username} was not created: {cause}"
            ))
            .with_details(json!({
                "reason": "account_provisioning_failed",
                "username": username,
                "identifier": identifier,
            })),
            ProvisioningError::Internal { message } => Error::internal(message)
                .with_details(json!({ "reason": "internal_error" })),
        }
    }
}

/// Use-case port for signing up a user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProvisioning: Send + Sync {
    /// Create the identity, then its ledger account, and return both.
    async fn provision(&self, request: SignupCredentials) -> Result<UserProfile, ProvisioningError>;
}
