//! Ledger account identifier shared by identities and ledger accounts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unsigned 64-bit identifier linking a user identity to its ledger account.
///
/// The identity store persists it alongside the username; the ledger engine
/// stores it (widened to 128 bits) as the account id.
///
/// # Examples
/// ```
/// use karma_backend::domain::AccountIdentifier;
///
/// let id: AccountIdentifier = "42".parse().expect("decimal identifier");
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountIdentifier(u64);

impl AccountIdentifier {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Identifier widened to the ledger engine's 128-bit id space.
    #[must_use]
    pub const fn as_ledger_id(self) -> u128 {
        self.0 as u128
    }

    /// Narrow a ledger id back to an identifier, failing when it does not fit.
    #[must_use]
    pub fn from_ledger_id(id: u128) -> Option<Self> {
        u64::try_from(id).ok().map(Self)
    }
}

impl From<u64> for AccountIdentifier {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for AccountIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised when an identifier string is not a decimal `u64`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("account identifier must be an unsigned 64-bit decimal integer")]
pub struct AccountIdentifierParseError;

impl FromStr for AccountIdentifier {
    type Err = AccountIdentifierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // `u64::from_str` accepts a leading '+', which is not a canonical id.
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AccountIdentifierParseError);
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| AccountIdentifierParseError)
    }
}
