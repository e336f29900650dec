//! Driven port for the external ledger engine.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{AccountIdentifier, LedgerAccount};

use super::define_port_error;

/// Reason the ledger engine refused to create an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerRejection {
    /// An account with the same id and fields already exists.
    Exists,
    /// An account with the same id but different fields already exists.
    ExistsWithDifferentFields,
    IdMustNotBeZero,
    IdMustNotBeIntMax,
    LedgerMustNotBeZero,
    CodeMustNotBeZero,
    /// Any other engine result code.
    Other(u32),
}

impl LedgerRejection {
    /// Parse a wire result name; unknown names become `Other(0)`.
    #[must_use]
    pub fn from_wire(name: &str, code: u32) -> Self {
        match name {
            "exists" => Self::Exists,
            "exists_with_different_fields" => Self::ExistsWithDifferentFields,
            "id_must_not_be_zero" => Self::IdMustNotBeZero,
            "id_must_not_be_int_max" => Self::IdMustNotBeIntMax,
            "ledger_must_not_be_zero" => Self::LedgerMustNotBeZero,
            "code_must_not_be_zero" => Self::CodeMustNotBeZero,
            _ => Self::Other(code),
        }
    }

    /// Whether the rejection means the id is already taken.
    #[must_use]
    pub const fn is_duplicate(self) -> bool {
        matches!(self, Self::Exists | Self::ExistsWithDifferentFields)
    }
}

impl fmt::Display for LedgerRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists => f.write_str("exists"),
            Self::ExistsWithDifferentFields => f.write_str("exists_with_different_fields"),
            Self::IdMustNotBeZero => f.write_str("id_must_not_be_zero"),
            Self::IdMustNotBeIntMax => f.write_str("id_must_not_be_int_max"),
            Self::LedgerMustNotBeZero => f.write_str("ledger_must_not_be_zero"),
            Self::CodeMustNotBeZero => f.write_str("code_must_not_be_zero"),
            Self::Other(code) => write!(f, "other({code})"),
        }
    }
}

define_port_error! {
    /// Errors raised by ledger engine adapters.
    pub enum LedgerStoreError {
        /// The engine could not be reached, or the call timed out.
        Unavailable { message: String } => "ledger engine unavailable: {message}",
        /// The engine refused the write; definitional, never retried.
        Rejected { reason: LedgerRejection } => "ledger engine rejected account: {reason}",
        /// The engine answered with a payload that could not be decoded.
        Decode { message: String } => "ledger engine response could not be decoded: {message}",
    }
}

impl LedgerStoreError {
    /// Whether a retry could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Access to ledger accounts keyed by [`AccountIdentifier`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create a zero-balance account with the fixed ledger and code, returning
    /// the stored record.
    async fn create(&self, identifier: AccountIdentifier) -> Result<LedgerAccount, LedgerStoreError>;

    /// Batch lookup; identifiers with no account are simply absent from the
    /// result.
    async fn lookup(
        &self,
        identifiers: &[AccountIdentifier],
    ) -> Result<Vec<LedgerAccount>, LedgerStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("exists", LedgerRejection::Exists)]
    #[case("exists_with_different_fields", LedgerRejection::ExistsWithDifferentFields)]
    #[case("id_must_not_be_zero", LedgerRejection::IdMustNotBeZero)]
    #[case("id_must_not_be_int_max", LedgerRejection::IdMustNotBeIntMax)]
    #[case("ledger_must_not_be_zero", LedgerRejection::LedgerMustNotBeZero)]
    #[case("code_must_not_be_zero", LedgerRejection::CodeMustNotBeZero)]
    #[case("flags_are_mutually_exclusive", LedgerRejection::Other(44))]
    fn wire_names_round_trip_through_display(
        #[case] wire: &str,
        #[case] expected: LedgerRejection,
    ) {
        let parsed = LedgerRejection::from_wire(wire, 44);
        assert_eq!(parsed, expected);
        if !matches!(parsed, LedgerRejection::Other(_)) {
            assert_eq!(parsed.to_string(), wire);
        }
    }

    #[rstest]
    fn only_unavailable_is_transient() {
        assert!(LedgerStoreError::unavailable("timeout").is_transient());
        assert!(!LedgerStoreError::rejected(LedgerRejection::Exists).is_transient());
        assert!(!LedgerStoreError::decode("bad json").is_transient());
    }
}
