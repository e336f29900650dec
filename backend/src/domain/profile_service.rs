//! Profile resolver joining an identity with its ledger account.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{
    IdentityStore, IdentityStoreError, LedgerStore, LedgerStoreError, ProfileQuery,
    ProfileResolutionError,
};
use crate::domain::{AccountSnapshot, RetryPolicy, UserProfile, Username};

/// Profile service implementing [`ProfileQuery`].
pub struct ProfileService<I: ?Sized, L: ?Sized> {
    identities: Arc<I>,
    ledger: Arc<L>,
    retry: RetryPolicy,
}

impl<I: ?Sized, L: ?Sized> ProfileService<I, L> {
    /// Create a resolver over the given stores; `retry` governs both reads.
    pub fn new(identities: Arc<I>, ledger: Arc<L>, retry: RetryPolicy) -> Self {
        Self {
            identities,
            ledger,
            retry,
        }
    }
}

fn map_identity_error(error: IdentityStoreError) -> ProfileResolutionError {
    match error {
        IdentityStoreError::Unavailable { message } => {
            ProfileResolutionError::StoreUnavailable { message }
        }
        other => ProfileResolutionError::Internal {
            message: other.to_string(),
        },
    }
}

fn map_ledger_read_error(error: LedgerStoreError) -> ProfileResolutionError {
    match error {
        LedgerStoreError::Unavailable { message } => {
            ProfileResolutionError::StoreUnavailable { message }
        }
        other => ProfileResolutionError::Internal {
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl<I, L> ProfileQuery for ProfileService<I, L>
where
    I: IdentityStore + ?Sized,
    L: LedgerStore + ?Sized,
{
    async fn resolve(&self, username: &Username) -> Result<UserProfile, ProfileResolutionError> {
        let identities = &self.identities;
        let identity = self
            .retry
            .run("identity.find", IdentityStoreError::is_transient, move || {
                identities.find(username)
            })
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| ProfileResolutionError::UserNotFound {
                username: username.to_string(),
            })?;

        let identifier = identity.identifier();
        let ledger = &self.ledger;
        let ids = [identifier];
        let ids = ids.as_slice();
        let account = self
            .retry
            .run("ledger.lookup", LedgerStoreError::is_transient, move || {
                ledger.lookup(ids)
            })
            .await
            .map_err(map_ledger_read_error)?
            .into_iter()
            .find(|account| account.identifier == identifier);

        let Some(account) = account else {
            warn!(%username, %identifier, "identity has no ledger account");
            return Err(ProfileResolutionError::AccountNotFound {
                username: username.to_string(),
                identifier,
            });
        };

        let snapshot = AccountSnapshot::try_from(&account)?;
        Ok(UserProfile::new(identity, snapshot))
    }
}
