//! Response bodies for the HTTP API.
//!
//! Domain read models stay serialisation-free; these DTOs fix the camelCase
//! wire shape. The credential digest never leaves the server.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccountSnapshot, OrphanReport, OrphanedIdentity, UserIdentity, UserProfile};

/// Public part of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[schema(example = "bob")]
    pub username: String,
    #[schema(example = "bob@example.com")]
    pub email: String,
    #[schema(example = 6512131979280412370_u64)]
    pub identifier: u64,
}

impl From<&UserIdentity> for UserView {
    fn from(identity: &UserIdentity) -> Self {
        Self {
            username: identity.username().to_string(),
            email: identity.email().to_string(),
            identifier: identity.identifier().get(),
        }
    }
}

/// Ledger account with balances narrowed to 64 bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAccountView {
    /// Account identifier, equal to the owner's identifier.
    pub id: u64,
    pub debits_pending: u64,
    pub debits_posted: u64,
    pub credits_pending: u64,
    pub credits_posted: u64,
    #[schema(example = 1)]
    pub ledger: u32,
    #[schema(example = 718)]
    pub code: u16,
    pub flags: u16,
    /// Engine-assigned creation time in nanoseconds.
    pub timestamp: u64,
}

impl From<&AccountSnapshot> for LedgerAccountView {
    fn from(account: &AccountSnapshot) -> Self {
        Self {
            id: account.identifier.get(),
            debits_pending: account.debits_pending,
            debits_posted: account.debits_posted,
            credits_pending: account.credits_pending,
            credits_posted: account.credits_posted,
            ledger: account.ledger,
            code: account.code,
            flags: account.flags,
            timestamp: account.timestamp,
        }
    }
}

/// Identity joined with its ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponse {
    /// Public identity fields.
    pub user: UserView,
    /// Ledger account and balances.
    pub account: LedgerAccountView,
}

impl From<&UserProfile> for UserProfileResponse {
    fn from(profile: &UserProfile) -> Self {
        Self {
            user: UserView::from(profile.identity()),
            account: LedgerAccountView::from(profile.account()),
        }
    }
}

/// An identity without a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrphanView {
    pub username: String,
    pub identifier: u64,
}

impl From<&OrphanedIdentity> for OrphanView {
    fn from(orphan: &OrphanedIdentity) -> Self {
        Self {
            username: orphan.username.to_string(),
            identifier: orphan.identifier.get(),
        }
    }
}

/// Identities without a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrphanReportResponse {
    /// Identities examined.
    pub scanned: usize,
    /// Orphans in username order.
    pub orphans: Vec<OrphanView>,
    /// More identities remain past the limit.
    pub truncated: bool,
}

impl From<&OrphanReport> for OrphanReportResponse {
    fn from(report: &OrphanReport) -> Self {
        Self {
            scanned: report.scanned,
            orphans: report.orphans.iter().map(OrphanView::from).collect(),
            truncated: report.truncated,
        }
    }
}
