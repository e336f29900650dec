//! Tests for the provisioning coordinator.

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::domain::credentials::test_deriver;
use crate::domain::ports::{
    LedgerRejection, LedgerStoreError, MockIdentityStore, MockLedgerStore,
};
use crate::domain::{
    AccountIdentifier, CredentialDigest, CredentialDigestError, CredentialDigester, LedgerAccount,
    Username, derive_identifier,
};
use rstest::{fixture, rstest};

#[fixture]
fn bob() -> SignupCredentials {
    SignupCredentials::try_from_parts("bob", "bob@example.com", "s3cr3t").expect("valid signup")
}

fn make_service(
    identities: MockIdentityStore,
    ledger: MockLedgerStore,
) -> ProvisioningService<MockIdentityStore, MockLedgerStore> {
    ProvisioningService::new(Arc::new(identities), Arc::new(ledger), test_deriver())
}

fn ledger_creating_accounts() -> MockLedgerStore {
    let mut ledger = MockLedgerStore::new();
    ledger
        .expect_create()
        .times(1)
        .returning(|id| Ok(LedgerAccount::zeroed(id)));
    ledger
}

#[rstest]
#[tokio::test]
async fn provisions_identity_then_account(bob: SignupCredentials) {
    let expected = derive_identifier("bob", "s3cr3t");
    let mut identities = MockIdentityStore::new();
    identities
        .expect_create()
        .withf(move |identity| {
            identity.username().as_str() == "bob" && identity.identifier() == expected
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(identities, ledger_creating_accounts());
    let profile = service.provision(bob).await.expect("provisioning succeeds");

    assert_eq!(profile.identity().identifier(), expected);
    assert_eq!(profile.account().identifier, expected);
    assert_eq!(profile.account().debits_pending, 0);
    assert_eq!(profile.account().debits_posted, 0);
    assert_eq!(profile.account().credits_pending, 0);
    assert_eq!(profile.account().credits_posted, 0);
}

#[rstest]
#[tokio::test]
async fn stored_digest_verifies_the_signup_password(bob: SignupCredentials) {
    let mut identities = MockIdentityStore::new();
    identities.expect_create().times(1).return_once(|_| Ok(()));

    let service = make_service(identities, ledger_creating_accounts());
    let profile = service.provision(bob).await.expect("provisioning succeeds");

    let deriver = test_deriver();
    let digest = profile.identity().credential_digest();
    assert!(deriver.verify(digest, "s3cr3t").expect("verify"));
    assert!(!deriver.verify(digest, "wrong").expect("verify"));
}

#[rstest]
#[tokio::test]
async fn duplicate_username_skips_the_ledger(bob: SignupCredentials) {
    let mut identities = MockIdentityStore::new();
    identities
        .expect_create()
        .times(1)
        .return_once(|_| Err(IdentityStoreError::already_exists("bob")));
    let mut ledger = MockLedgerStore::new();
    ledger.expect_create().never();

    let service = make_service(identities, ledger);
    let err = service.provision(bob).await.expect_err("duplicate");

    assert_eq!(
        err,
        ProvisioningError::UserAlreadyExists {
            username: "bob".to_owned()
        }
    );
}

#[rstest]
#[tokio::test]
async fn identity_store_outage_is_reported_without_ledger_call(bob: SignupCredentials) {
    let mut identities = MockIdentityStore::new();
    identities
        .expect_create()
        .times(1)
        .return_once(|_| Err(IdentityStoreError::unavailable("connection refused")));
    let mut ledger = MockLedgerStore::new();
    ledger.expect_create().never();

    let service = make_service(identities, ledger);
    let err = service.provision(bob).await.expect_err("outage");

    assert!(matches!(err, ProvisioningError::IdentityStoreUnavailable { .. }));
}

#[rstest]
#[case(LedgerStoreError::unavailable("timeout"))]
#[case(LedgerStoreError::rejected(LedgerRejection::Exists))]
#[case(LedgerStoreError::decode("truncated body"))]
#[tokio::test]
async fn ledger_failure_leaves_identity_in_place(
    bob: SignupCredentials,
    #[case] failure: LedgerStoreError,
) {
    let mut identities = MockIdentityStore::new();
    identities.expect_create().times(1).return_once(|_| Ok(()));
    let mut ledger = MockLedgerStore::new();
    let returned = failure.clone();
    ledger
        .expect_create()
        .times(1)
        .return_once(move |_| Err(returned));

    let service = make_service(identities, ledger);
    let err = service.provision(bob).await.expect_err("ledger failure");

    assert_eq!(
        err,
        ProvisioningError::AccountProvisioningFailed {
            username: "bob".to_owned(),
            identifier: derive_identifier("bob", "s3cr3t"),
            cause: failure,
        }
    );
}

struct BrokenDigester;

impl CredentialDigester for BrokenDigester {
    fn digest(&self, _password: &str) -> Result<CredentialDigest, CredentialDigestError> {
        Err(CredentialDigestError::new("rng unavailable"))
    }

    fn verify(
        &self,
        _digest: &CredentialDigest,
        _password: &str,
    ) -> Result<bool, CredentialDigestError> {
        Err(CredentialDigestError::new("rng unavailable"))
    }
}

#[rstest]
#[tokio::test]
async fn digest_failure_is_internal_and_writes_nothing(bob: SignupCredentials) {
    let mut identities = MockIdentityStore::new();
    identities.expect_create().never();
    let mut ledger = MockLedgerStore::new();
    ledger.expect_create().never();

    let service = ProvisioningService::new(
        Arc::new(identities),
        Arc::new(ledger),
        CredentialDeriver::new(Arc::new(BrokenDigester)),
    );
    let err = service.provision(bob).await.expect_err("digest failure");

    assert!(matches!(err, ProvisioningError::Internal { .. }));
}

#[rstest]
#[tokio::test]
async fn oversized_engine_balances_fail_closed(bob: SignupCredentials) {
    let mut identities = MockIdentityStore::new();
    identities.expect_create().times(1).return_once(|_| Ok(()));
    let mut ledger = MockLedgerStore::new();
    ledger.expect_create().times(1).returning(|id: AccountIdentifier| {
        let mut account = LedgerAccount::zeroed(id);
        account.balances.credits_posted = u128::MAX;
        Ok(account)
    });

    let service = make_service(identities, ledger);
    let err = service.provision(bob).await.expect_err("overflow");

    assert!(matches!(err, ProvisioningError::Internal { .. }));
}

#[rstest]
fn stages_render_as_snake_case() {
    assert_eq!(ProvisioningStage::IdentifierDerived.to_string(), "identifier_derived");
    assert_eq!(ProvisioningStage::AccountCreated.to_string(), "account_created");
}

/// Ledger whose creates take longer than any step budget used below.
struct StalledLedger {
    delay: Duration,
}

#[async_trait]
impl LedgerStore for StalledLedger {
    async fn create(&self, identifier: AccountIdentifier) -> Result<LedgerAccount, LedgerStoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(LedgerAccount::zeroed(identifier))
    }

    async fn lookup(
        &self,
        _identifiers: &[AccountIdentifier],
    ) -> Result<Vec<LedgerAccount>, LedgerStoreError> {
        Ok(Vec::new())
    }
}

#[rstest]
#[tokio::test]
async fn slow_ledger_create_is_reported_as_an_orphan(bob: SignupCredentials) {
    let mut identities = MockIdentityStore::new();
    identities.expect_create().times(1).return_once(|_| Ok(()));

    let service = ProvisioningService::new(
        Arc::new(identities),
        Arc::new(StalledLedger {
            delay: Duration::from_millis(500),
        }),
        test_deriver(),
    )
    .with_step_timeout(Duration::from_millis(50));
    let err = service.provision(bob).await.expect_err("ledger overran");

    let ProvisioningError::AccountProvisioningFailed {
        username,
        identifier,
        cause,
    } = err
    else {
        panic!("expected an orphan report, got {err:?}");
    };
    assert_eq!(username, "bob");
    assert_eq!(identifier, derive_identifier("bob", "s3cr3t"));
    assert!(cause.is_transient());
}

/// Identity store whose writes never finish.
struct StalledIdentities;

#[async_trait]
impl IdentityStore for StalledIdentities {
    async fn exists(&self, _username: &Username) -> Result<bool, IdentityStoreError> {
        Ok(false)
    }

    async fn create(&self, _identity: &UserIdentity) -> Result<(), IdentityStoreError> {
        std::future::pending::<Result<(), IdentityStoreError>>().await
    }

    async fn find(&self, _username: &Username) -> Result<Option<UserIdentity>, IdentityStoreError> {
        Ok(None)
    }

    async fn list_after(
        &self,
        _after: Option<Username>,
        _limit: usize,
    ) -> Result<Vec<UserIdentity>, IdentityStoreError> {
        Ok(Vec::new())
    }
}

#[rstest]
#[tokio::test]
async fn stalled_identity_write_is_an_outage_and_skips_the_ledger(bob: SignupCredentials) {
    let mut ledger = MockLedgerStore::new();
    ledger.expect_create().never();

    let service = ProvisioningService::new(
        Arc::new(StalledIdentities),
        Arc::new(ledger),
        test_deriver(),
    )
    .with_step_timeout(Duration::from_millis(50));
    let err = service.provision(bob).await.expect_err("identity overran");

    assert!(matches!(err, ProvisioningError::IdentityStoreUnavailable { .. }));
}
