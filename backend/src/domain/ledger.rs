//! Ledger account records and their presentation form.
//!
//! The ledger engine owns balances as 128-bit counters. This layer only ever
//! creates zeroed accounts and reads them back; presentation narrows each
//! counter to `u64` and fails closed when a value does not fit.

use std::fmt;

use super::AccountIdentifier;

/// Ledger partition every account is created in.
pub const ACCOUNT_LEDGER: u32 = 1;
/// Account-type tag every account is created with.
pub const ACCOUNT_CODE: u16 = 718;

/// The four monotonic balance counters maintained by the ledger engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerBalances {
    pub debits_pending: u128,
    pub debits_posted: u128,
    pub credits_pending: u128,
    pub credits_posted: u128,
}

/// Ledger account as stored by the ledger engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerAccount {
    /// Account primary key.
    pub identifier: AccountIdentifier,
    /// Native-width counters.
    pub balances: LedgerBalances,
    /// Ledger partition, always [`ACCOUNT_LEDGER`].
    pub ledger: u32,
    /// Account-type tag, always [`ACCOUNT_CODE`].
    pub code: u16,
    /// Engine flags; zero for accounts created here.
    pub flags: u16,
    /// Assigned by the engine at creation; zero until then.
    pub timestamp: u64,
}

impl LedgerAccount {
    /// A fresh account with zero balances and the fixed ledger and code.
    ///
    /// # Examples
    /// ```
    /// use karma_backend::domain::{AccountIdentifier, LedgerAccount, ACCOUNT_CODE};
    ///
    /// let account = LedgerAccount::zeroed(AccountIdentifier::new(7));
    /// assert_eq!(account.code, ACCOUNT_CODE);
    /// assert_eq!(account.balances.credits_posted, 0);
    /// ```
    #[must_use]
    pub fn zeroed(identifier: AccountIdentifier) -> Self {
        Self {
            identifier,
            balances: LedgerBalances::default(),
            ledger: ACCOUNT_LEDGER,
            code: ACCOUNT_CODE,
            flags: 0,
            timestamp: 0,
        }
    }
}

/// Names a balance counter in presentation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceField {
    DebitsPending,
    DebitsPosted,
    CreditsPending,
    CreditsPosted,
}

impl BalanceField {
    /// camelCase field name as exposed to clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DebitsPending => "debitsPending",
            Self::DebitsPosted => "debitsPosted",
            Self::CreditsPending => "creditsPending",
            Self::CreditsPosted => "creditsPosted",
        }
    }
}

impl fmt::Display for BalanceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A balance counter exceeded the `u64` presentation range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("balance {field} of account {identifier} does not fit in 64 bits")]
pub struct BalanceOutOfRange {
    /// Account holding the oversized counter.
    pub identifier: AccountIdentifier,
    /// The counter that overflowed.
    pub field: BalanceField,
}

/// Ledger account narrowed for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Account primary key.
    pub identifier: AccountIdentifier,
    pub debits_pending: u64,
    pub debits_posted: u64,
    pub credits_pending: u64,
    pub credits_posted: u64,
    /// Ledger partition, always [`ACCOUNT_LEDGER`].
    pub ledger: u32,
    /// Account-type tag, always [`ACCOUNT_CODE`].
    pub code: u16,
    /// Engine flags; zero for accounts created here.
    pub flags: u16,
    /// Engine-assigned creation time in nanoseconds.
    pub timestamp: u64,
}

fn narrow(
    identifier: AccountIdentifier,
    field: BalanceField,
    value: u128,
) -> Result<u64, BalanceOutOfRange> {
    u64::try_from(value).map_err(|_| BalanceOutOfRange { identifier, field })
}

impl TryFrom<&LedgerAccount> for AccountSnapshot {
    type Error = BalanceOutOfRange;

    fn try_from(account: &LedgerAccount) -> Result<Self, Self::Error> {
        let id = account.identifier;
        let b = account.balances;
        Ok(Self {
            identifier: id,
            debits_pending: narrow(id, BalanceField::DebitsPending, b.debits_pending)?,
            debits_posted: narrow(id, BalanceField::DebitsPosted, b.debits_posted)?,
            credits_pending: narrow(id, BalanceField::CreditsPending, b.credits_pending)?,
            credits_posted: narrow(id, BalanceField::CreditsPosted, b.credits_posted)?,
            ledger: account.ledger,
            code: account.code,
            flags: account.flags,
            timestamp: account.timestamp,
        })
    }
}
