//! Direct ledger account reads and creation, without an identity step.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::domain::ports::{LedgerAccountError, LedgerAccounts, LedgerStore, LedgerStoreError};
use crate::domain::{AccountIdentifier, AccountSnapshot, RetryPolicy};

/// Ledger account service implementing [`LedgerAccounts`].
pub struct LedgerAccountService<L: ?Sized> {
    ledger: Arc<L>,
    retry: RetryPolicy,
}

impl<L: ?Sized> LedgerAccountService<L> {
    /// Create the service; `retry` applies to lookups only.
    pub fn new(ledger: Arc<L>, retry: RetryPolicy) -> Self {
        Self { ledger, retry }
    }
}

#[async_trait]
impl<L> LedgerAccounts for LedgerAccountService<L>
where
    L: LedgerStore + ?Sized,
{
    async fn get_account(
        &self,
        identifier: AccountIdentifier,
    ) -> Result<AccountSnapshot, LedgerAccountError> {
        let ledger = &self.ledger;
        let ids = [identifier];
        let ids = ids.as_slice();
        let accounts = self
            .retry
            .run("ledger.lookup", LedgerStoreError::is_transient, move || {
                ledger.lookup(ids)
            })
            .await
            .map_err(|err| match err {
                LedgerStoreError::Unavailable { message } => {
                    LedgerAccountError::StoreUnavailable { message }
                }
                other => LedgerAccountError::Internal {
                    message: other.to_string(),
                },
            })?;

        let account = accounts
            .into_iter()
            .find(|account| account.identifier == identifier)
            .ok_or(LedgerAccountError::NotFound { identifier })?;
        Ok(AccountSnapshot::try_from(&account)?)
    }

    async fn create_account(
        &self,
        identifier: AccountIdentifier,
    ) -> Result<AccountSnapshot, LedgerAccountError> {
        let account = self.ledger.create(identifier).await.map_err(|cause| {
            error!(%identifier, error = %cause, "ledger account creation failed");
            LedgerAccountError::ProvisioningFailed { identifier, cause }
        })?;
        Ok(AccountSnapshot::try_from(&account)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{LedgerRejection, MockLedgerStore};
    use crate::domain::LedgerAccount;
    use rstest::rstest;

    const ID: AccountIdentifier = AccountIdentifier::new(1234);

    fn make_service(ledger: MockLedgerStore) -> LedgerAccountService<MockLedgerStore> {
        LedgerAccountService::new(Arc::new(ledger), RetryPolicy::none())
    }

    #[rstest]
    #[tokio::test]
    async fn get_returns_the_matching_account() {
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_lookup()
            .times(1)
            .returning(|ids| Ok(ids.iter().copied().map(LedgerAccount::zeroed).collect()));

        let snapshot = make_service(ledger).get_account(ID).await.expect("account");
        assert_eq!(snapshot.identifier, ID);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_lookup_is_not_found() {
        let mut ledger = MockLedgerStore::new();
        ledger.expect_lookup().times(1).returning(|_| Ok(Vec::new()));

        let err = make_service(ledger).get_account(ID).await.expect_err("missing");
        assert_eq!(err, LedgerAccountError::NotFound { identifier: ID });
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_outage_is_store_unavailable() {
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_lookup()
            .times(1)
            .returning(|_| Err(LedgerStoreError::unavailable("timeout")));

        let err = make_service(ledger).get_account(ID).await.expect_err("outage");
        assert!(matches!(err, LedgerAccountError::StoreUnavailable { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn create_returns_zeroed_snapshot() {
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_create()
            .withf(|id| *id == ID)
            .times(1)
            .returning(|id| Ok(LedgerAccount::zeroed(id)));

        let snapshot = make_service(ledger).create_account(ID).await.expect("created");
        assert_eq!(snapshot.debits_pending, 0);
        assert_eq!(snapshot.code, crate::domain::ACCOUNT_CODE);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_create_is_not_retried() {
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_create()
            .times(1)
            .returning(|_| Err(LedgerStoreError::rejected(LedgerRejection::Exists)));

        let service = LedgerAccountService::new(
            Arc::new(ledger),
            RetryPolicy::new(3, std::time::Duration::ZERO),
        );
        let err = service.create_account(ID).await.expect_err("duplicate");
        assert_eq!(
            err,
            LedgerAccountError::ProvisioningFailed {
                identifier: ID,
                cause: LedgerStoreError::rejected(LedgerRejection::Exists),
            }
        );
    }
}
