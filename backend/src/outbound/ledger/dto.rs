//! Wire DTOs for the ledger engine's JSON gateway.
//!
//! 128-bit counters, and the 64-bit timestamp and user data, travel as
//! decimal strings so no JSON number loses precision.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountIdentifier, LedgerAccount, LedgerBalances};

/// Serde helpers for integers encoded as decimal strings.
mod decimal {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub(super) fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|err| de::Error::custom(format!("invalid decimal {raw:?}: {err}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountDto {
    #[serde(with = "decimal")]
    pub(super) id: u128,
    #[serde(with = "decimal")]
    pub(super) debits_pending: u128,
    #[serde(with = "decimal")]
    pub(super) debits_posted: u128,
    #[serde(with = "decimal")]
    pub(super) credits_pending: u128,
    #[serde(with = "decimal")]
    pub(super) credits_posted: u128,
    #[serde(with = "decimal", default)]
    pub(super) user_data_128: u128,
    #[serde(with = "decimal", default)]
    pub(super) user_data_64: u64,
    #[serde(default)]
    pub(super) user_data_32: u32,
    pub(super) ledger: u32,
    pub(super) code: u16,
    #[serde(default)]
    pub(super) flags: u16,
    #[serde(with = "decimal", default)]
    pub(super) timestamp: u64,
}

impl From<&LedgerAccount> for AccountDto {
    fn from(account: &LedgerAccount) -> Self {
        Self {
            id: account.identifier.as_ledger_id(),
            debits_pending: account.balances.debits_pending,
            debits_posted: account.balances.debits_posted,
            credits_pending: account.balances.credits_pending,
            credits_posted: account.balances.credits_posted,
            user_data_128: 0,
            user_data_64: 0,
            user_data_32: 0,
            ledger: account.ledger,
            code: account.code,
            flags: account.flags,
            timestamp: account.timestamp,
        }
    }
}

impl AccountDto {
    /// Accounts outside the 64-bit identifier space are not ours to decode.
    pub(super) fn into_domain(self) -> Result<LedgerAccount, String> {
        let identifier = AccountIdentifier::from_ledger_id(self.id)
            .ok_or_else(|| format!("account id {} exceeds 64 bits", self.id))?;
        Ok(LedgerAccount {
            identifier,
            balances: LedgerBalances {
                debits_pending: self.debits_pending,
                debits_posted: self.debits_posted,
                credits_pending: self.credits_pending,
                credits_posted: self.credits_posted,
            },
            ledger: self.ledger,
            code: self.code,
            flags: self.flags,
            timestamp: self.timestamp,
        })
    }
}

/// One failed entry of a create batch; successes are omitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(super) struct CreateFailureDto {
    pub(super) index: u32,
    pub(super) result: String,
    #[serde(default)]
    pub(super) code: u32,
}

/// Lookup request body: identifiers as decimal strings.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub(super) struct LookupRequestDto(pub(super) Vec<String>);

impl LookupRequestDto {
    pub(super) fn new(identifiers: &[AccountIdentifier]) -> Self {
        Self(
            identifiers
                .iter()
                .map(|id| id.as_ledger_id().to_string())
                .collect(),
        )
    }
}
