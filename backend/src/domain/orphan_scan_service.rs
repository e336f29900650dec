//! Orphan scan: identities whose identifier has no ledger account.
//!
//! Identities are paged in username order and each page is checked against
//! the ledger with one batched lookup. The scan only reads; repairing an
//! orphan is left to operators.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    IdentityStore, IdentityStoreError, LedgerStore, LedgerStoreError, OrphanReconciliation,
    ReconciliationError,
};
use crate::domain::{AccountIdentifier, OrphanReport, OrphanedIdentity, RetryPolicy, Username};

/// Orphans reported when the caller does not ask for a limit.
pub const DEFAULT_ORPHAN_LIMIT: usize = 100;
/// Upper bound on orphans reported by one scan.
pub const MAX_ORPHAN_LIMIT: usize = 1000;
/// Identities read per page.
pub const ORPHAN_SCAN_PAGE_SIZE: usize = 100;

/// Orphan scanner implementing [`OrphanReconciliation`].
pub struct OrphanScanService<I: ?Sized, L: ?Sized> {
    identities: Arc<I>,
    ledger: Arc<L>,
    retry: RetryPolicy,
    page_size: usize,
}

impl<I: ?Sized, L: ?Sized> OrphanScanService<I, L> {
    /// Create a scanner with the default page size.
    pub fn new(identities: Arc<I>, ledger: Arc<L>, retry: RetryPolicy) -> Self {
        Self {
            identities,
            ledger,
            retry,
            page_size: ORPHAN_SCAN_PAGE_SIZE,
        }
    }

    /// Override the page size (at least one).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

fn map_identity_error(error: IdentityStoreError) -> ReconciliationError {
    match error {
        IdentityStoreError::Unavailable { message } => {
            ReconciliationError::StoreUnavailable { message }
        }
        other => ReconciliationError::Internal {
            message: other.to_string(),
        },
    }
}

fn map_ledger_error(error: LedgerStoreError) -> ReconciliationError {
    match error {
        LedgerStoreError::Unavailable { message } => {
            ReconciliationError::StoreUnavailable { message }
        }
        other => ReconciliationError::Internal {
            message: other.to_string(),
        },
    }
}

impl<I, L> OrphanScanService<I, L>
where
    I: IdentityStore + ?Sized,
    L: LedgerStore + ?Sized,
{
    async fn existing_accounts(
        &self,
        ids: &[AccountIdentifier],
    ) -> Result<HashSet<AccountIdentifier>, ReconciliationError> {
        let ledger = &self.ledger;
        let accounts = self
            .retry
            .run("ledger.lookup", LedgerStoreError::is_transient, move || {
                ledger.lookup(ids)
            })
            .await
            .map_err(map_ledger_error)?;
        Ok(accounts.into_iter().map(|account| account.identifier).collect())
    }
}

#[async_trait]
impl<I, L> OrphanReconciliation for OrphanScanService<I, L>
where
    I: IdentityStore + ?Sized,
    L: LedgerStore + ?Sized,
{
    async fn find_orphans(&self, limit: usize) -> Result<OrphanReport, ReconciliationError> {
        let limit = limit.clamp(1, MAX_ORPHAN_LIMIT);
        let page_size = self.page_size;
        let identities = &self.identities;
        let mut report = OrphanReport::default();
        let mut cursor: Option<Username> = None;

        loop {
            let after = cursor.clone();
            let page = self
                .retry
                .run("identity.list", IdentityStoreError::is_transient, move || {
                    identities.list_after(after.clone(), page_size)
                })
                .await
                .map_err(map_identity_error)?;
            if page.is_empty() {
                break;
            }

            let ids: Vec<AccountIdentifier> =
                page.iter().map(|identity| identity.identifier()).collect();
            let existing = self.existing_accounts(&ids).await?;

            for identity in &page {
                if existing.contains(&identity.identifier()) {
                    report.scanned += 1;
                    continue;
                }
                if report.orphans.len() == limit {
                    report.truncated = true;
                    info!(
                        scanned = report.scanned,
                        orphans = report.orphans.len(),
                        "orphan scan stopped at limit"
                    );
                    return Ok(report);
                }
                report.scanned += 1;
                report.orphans.push(OrphanedIdentity {
                    username: identity.username().clone(),
                    identifier: identity.identifier(),
                });
            }

            if page.len() < page_size {
                break;
            }
            cursor = page.last().map(|identity| identity.username().clone());
        }

        info!(
            scanned = report.scanned,
            orphans = report.orphans.len(),
            "orphan scan complete"
        );
        Ok(report)
    }
}
