//! Read models returned by the driving ports.

use super::{AccountIdentifier, AccountSnapshot, UserIdentity, Username};

/// An identity joined with its ledger account, built per request and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    identity: UserIdentity,
    account: AccountSnapshot,
}

impl UserProfile {
    /// Pair an identity with the snapshot of its account.
    pub fn new(identity: UserIdentity, account: AccountSnapshot) -> Self {
        Self { identity, account }
    }

    /// The identity half of the profile.
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// The ledger account half of the profile.
    pub fn account(&self) -> &AccountSnapshot {
        &self.account
    }
}

/// An identity whose identifier has no ledger account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedIdentity {
    /// Owner of the orphaned record.
    pub username: Username,
    /// Identifier the missing ledger account would carry.
    pub identifier: AccountIdentifier,
}

/// Result of an orphan scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanReport {
    /// Identities examined before the scan stopped.
    pub scanned: usize,
    /// Orphans found, in username order.
    pub orphans: Vec<OrphanedIdentity>,
    /// `true` when the scan stopped at the limit with identities left unread.
    pub truncated: bool,
}
