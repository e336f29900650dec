//! Provisioning coordinator: identity first, then the ledger account.
//!
//! The sequence is `Start → IdentifierDerived → IdentityCreated →
//! AccountCreated`, strictly ordered and never retried. When the ledger step
//! fails the stored identity is left in place (no compensating delete); the
//! failure is logged with the username and identifier, and the orphan shows
//! up in [`crate::domain::ports::OrphanReconciliation`] scans.
//!
//! Each store call is bounded by its own step timeout. Once the identity is
//! written the sequence always runs to a reported outcome: a ledger call that
//! overruns becomes `AccountProvisioningFailed`, never a silent cancellation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};
use zeroize::Zeroizing;

use crate::domain::ports::{
    IdentityStore, IdentityStoreError, LedgerStore, LedgerStoreError, ProvisioningError,
    UserProvisioning,
};
use crate::domain::{
    AccountSnapshot, CredentialDeriver, DerivedCredentials, SignupCredentials, UserIdentity,
    UserProfile,
};

/// Steps of the provisioning sequence, used in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStage {
    Start,
    IdentifierDerived,
    IdentityCreated,
    AccountCreated,
}

impl fmt::Display for ProvisioningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::IdentifierDerived => "identifier_derived",
            Self::IdentityCreated => "identity_created",
            Self::AccountCreated => "account_created",
        })
    }
}

/// Upper bound on a single store call when none is configured.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(10);

/// Provisioning service implementing [`UserProvisioning`].
pub struct ProvisioningService<I: ?Sized, L: ?Sized> {
    identities: Arc<I>,
    ledger: Arc<L>,
    deriver: CredentialDeriver,
    step_timeout: Duration,
}

impl<I: ?Sized, L: ?Sized> ProvisioningService<I, L> {
    /// Create a coordinator over the given stores.
    pub fn new(identities: Arc<I>, ledger: Arc<L>, deriver: CredentialDeriver) -> Self {
        Self {
            identities,
            ledger,
            deriver,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Bound each identity and ledger call by `step_timeout`.
    #[must_use]
    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }
}

/// Await a store call, yielding `None` when it overruns `limit`.
async fn bounded<T>(limit: Duration, call: impl Future<Output = T>) -> Option<T> {
    tokio::time::timeout(limit, call).await.ok()
}

fn map_identity_error(error: IdentityStoreError) -> ProvisioningError {
    match error {
        IdentityStoreError::AlreadyExists { username } => {
            ProvisioningError::UserAlreadyExists { username }
        }
        IdentityStoreError::Unavailable { message } => {
            ProvisioningError::IdentityStoreUnavailable { message }
        }
        IdentityStoreError::Query { message } => ProvisioningError::Internal {
            message: format!("identity store error: {message}"),
        },
    }
}

impl<I, L> ProvisioningService<I, L>
where
    I: IdentityStore + ?Sized,
    L: LedgerStore + ?Sized,
{
    /// Argon2 is CPU-bound, so derivation runs off the async workers.
    async fn derive(
        &self,
        request: &SignupCredentials,
    ) -> Result<DerivedCredentials, ProvisioningError> {
        let deriver = self.deriver.clone();
        let username = request.username().as_str().to_owned();
        let password = Zeroizing::new(request.password().to_owned());
        tokio::task::spawn_blocking(move || deriver.derive(&username, &password))
            .await
            .map_err(|err| ProvisioningError::Internal {
                message: format!("credential derivation task failed: {err}"),
            })?
            .map_err(|err| ProvisioningError::Internal {
                message: err.to_string(),
            })
    }
}

#[async_trait]
impl<I, L> UserProvisioning for ProvisioningService<I, L>
where
    I: IdentityStore + ?Sized,
    L: LedgerStore + ?Sized,
{
    async fn provision(&self, request: SignupCredentials) -> Result<UserProfile, ProvisioningError> {
        let username = request.username().clone();
        debug!(stage = %ProvisioningStage::Start, %username, "provisioning user");

        let derived = self.derive(&request).await?;
        let identifier = derived.identifier;
        debug!(stage = %ProvisioningStage::IdentifierDerived, %username, %identifier, "identifier derived");

        let identity = UserIdentity::new(
            username.clone(),
            request.email().clone(),
            identifier,
            derived.digest,
        );
        let limit = self.step_timeout;
        bounded(limit, self.identities.create(&identity))
            .await
            .unwrap_or_else(|| {
                Err(IdentityStoreError::unavailable(format!(
                    "identity create timed out after {}ms",
                    limit.as_millis()
                )))
            })
            .map_err(map_identity_error)?;
        debug!(stage = %ProvisioningStage::IdentityCreated, %username, %identifier, "identity stored");

        let created = bounded(limit, self.ledger.create(identifier))
            .await
            .unwrap_or_else(|| {
                Err(LedgerStoreError::unavailable(format!(
                    "ledger create timed out after {}ms",
                    limit.as_millis()
                )))
            });
        let account = match created {
            Ok(account) => account,
            Err(cause) => {
                error!(
                    %username,
                    %identifier,
                    error = %cause,
                    "ledger account creation failed; identity left without an account"
                );
                return Err(ProvisioningError::AccountProvisioningFailed {
                    username: username.to_string(),
                    identifier,
                    cause,
                });
            }
        };
        let snapshot =
            AccountSnapshot::try_from(&account).map_err(|err| ProvisioningError::Internal {
                message: err.to_string(),
            })?;
        debug!(stage = %ProvisioningStage::AccountCreated, %username, %identifier, "ledger account created");

        Ok(UserProfile::new(identity, snapshot))
    }
}

#[cfg(test)]
#[path = "provisioning_service_tests.rs"]
mod tests;
