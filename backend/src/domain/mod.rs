//! Domain primitives, services and ports.
//!
//! Purpose: define the identity and ledger types, the provisioning and
//! resolution services, and the ports separating them from adapters. Keep
//! types free of transport and persistence concerns; inbound adapters own
//! serialisation and outbound adapters own storage formats.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport-agnostic error payload.
//! - `Username`, `EmailAddress`, `SignupCredentials`, `UserIdentity`.
//! - `AccountIdentifier`, `LedgerAccount`, `AccountSnapshot`.
//! - `CredentialDeriver` and the `CredentialDigester` trait.
//! - Services: `ProvisioningService`, `ProfileService`,
//!   `LedgerAccountService`, `OrphanScanService`.

pub mod account_id;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod ledger_account_service;
pub mod orphan_scan_service;
pub mod ports;
pub mod profile;
pub mod profile_service;
pub mod provisioning_service;
pub mod retry;
pub mod trace_id;

pub use self::account_id::{AccountIdentifier, AccountIdentifierParseError};
pub use self::credentials::{
    Argon2Digester, CredentialDeriver, CredentialDigest, CredentialDigestError,
    CredentialDigester, DerivedCredentials, derive_identifier,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity::{
    EMAIL_MAX, EmailAddress, IdentityValidationError, SignupCredentials, USERNAME_MAX,
    UserIdentity, Username,
};
pub use self::ledger::{
    ACCOUNT_CODE, ACCOUNT_LEDGER, AccountSnapshot, BalanceField, BalanceOutOfRange,
    LedgerAccount, LedgerBalances,
};
pub use self::ledger_account_service::LedgerAccountService;
pub use self::orphan_scan_service::{
    DEFAULT_ORPHAN_LIMIT, MAX_ORPHAN_LIMIT, ORPHAN_SCAN_PAGE_SIZE, OrphanScanService,
};
pub use self::profile::{OrphanReport, OrphanedIdentity, UserProfile};
pub use self::profile_service::ProfileService;
pub use self::provisioning_service::{
    DEFAULT_STEP_TIMEOUT, ProvisioningService, ProvisioningStage,
};
pub use self::retry::RetryPolicy;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
