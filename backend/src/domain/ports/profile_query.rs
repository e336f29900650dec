//! Driving port for resolving a user's combined profile.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{AccountIdentifier, BalanceOutOfRange, Error, UserProfile, Username};

/// Failures while joining an identity with its ledger account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileResolutionError {
    /// No identity exists for the username; the ledger was not consulted.
    #[error("user {username} not found")]
    UserNotFound { username: String },
    /// The identity exists but its ledger account does not (an orphan).
    #[error("ledger account {identifier} for {username} not found")]
    AccountNotFound {
        username: String,
        identifier: AccountIdentifier,
    },
    /// Either store could not be reached.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },
    /// A balance counter cannot be presented without truncation.
    #[error(transparent)]
    BalanceOutOfRange(#[from] BalanceOutOfRange),
    /// An unexpected store fault or undecodable response.
    #[error("profile resolution failed: {message}")]
    Internal { message: String },
}

impl From<ProfileResolutionError> for Error {
    fn from(value: ProfileResolutionError) -> Self {
        match value {
            ProfileResolutionError::UserNotFound { username } => {
                Error::not_found(format!("user {username} not found")).with_details(json!({
                    "reason": "user_not_found",
                    "username": username,
                }))
            }
            ProfileResolutionError::AccountNotFound {
                username,
                identifier,
            } => Error::not_found(format!("ledger account for user {username} not found"))
                .with_details(json!({
                    "reason": "account_not_found",
                    "username": username,
                    "identifier": identifier,
                })),
            ProfileResolutionError::StoreUnavailable { .. } => {
                store_unavailable_error()
            }
            ProfileResolutionError::BalanceOutOfRange(err) => balance_out_of_range_error(&err),
            ProfileResolutionError::Internal { message } => Error::internal(message)
                .with_details(json!({ "reason": "internal_error" })),
        }
    }
}

/// Shared mapping for store outages on read paths.
pub(crate) fn store_unavailable_error() -> Error {
    Error::service_unavailable("a backing store is unavailable")
        .with_details(json!({ "reason": "store_unavailable" }))
}

/// Shared mapping for counters that do not fit the presentation width.
pub(crate) fn balance_out_of_range_error(err: &BalanceOutOfRange) -> Error {
    Error::internal(err.to_string()).with_details(json!({
        "reason": "balance_out_of_range",
        "field": err.field.as_str(),
        "identifier": err.identifier,
    }))
}

/// Use-case port for reading a user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Join the identity for `username` with its ledger account.
    async fn resolve(&self, username: &Username) -> Result<UserProfile, ProfileResolutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BalanceField, ErrorCode};
    use rstest::rstest;

    #[rstest]
    #[case(
        ProfileResolutionError::UserNotFound { username: "ghost".to_owned() },
        ErrorCode::NotFound,
        "user_not_found"
    )]
    #[case(
        ProfileResolutionError::AccountNotFound {
            username: "bob".to_owned(),
            identifier: AccountIdentifier::new(9),
        },
        ErrorCode::NotFound,
        "account_not_found"
    )]
    #[case(
        ProfileResolutionError::StoreUnavailable { message: "timeout".to_owned() },
        ErrorCode::ServiceUnavailable,
        "store_unavailable"
    )]
    #[case(
        ProfileResolutionError::BalanceOutOfRange(BalanceOutOfRange {
            identifier: AccountIdentifier::new(9),
            field: BalanceField::CreditsPosted,
        }),
        ErrorCode::InternalError,
        "balance_out_of_range"
    )]
    fn maps_to_domain_error(
        #[case] err: ProfileResolutionError,
        #[case] code: ErrorCode,
        #[case] reason: &str,
    ) {
        let mapped = Error::from(err);
        assert_eq!(mapped.code(), code);
        assert_eq!(mapped.reason(), Some(reason));
    }
}
