//! Process-local ledger engine for development and tests.
//!
//! Applies the same create rules as the real engine for the accounts this
//! service writes: id zero is refused, a second create for an id is refused
//! with `exists`, and each account gets a strictly increasing nanosecond
//! timestamp.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{LedgerRejection, LedgerStore, LedgerStoreError};
use crate::domain::{AccountIdentifier, LedgerAccount};

#[derive(Default)]
struct EngineState {
    accounts: BTreeMap<AccountIdentifier, LedgerAccount>,
    last_timestamp: u64,
}

/// In-memory [`LedgerStore`].
pub struct InMemoryLedgerEngine {
    clock: Arc<dyn Clock>,
    state: Mutex<EngineState>,
}

impl InMemoryLedgerEngine {
    /// Create an empty engine stamping accounts from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(EngineState::default()),
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, EngineState>, LedgerStoreError> {
        self.state
            .lock()
            .map_err(|_| LedgerStoreError::unavailable("ledger state lock poisoned"))
    }

    fn clock_nanos(&self) -> u64 {
        self.clock
            .utc()
            .timestamp_nanos_opt()
            .and_then(|nanos| u64::try_from(nanos).ok())
            .unwrap_or(0)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerEngine {
    async fn create(&self, identifier: AccountIdentifier) -> Result<LedgerAccount, LedgerStoreError> {
        if identifier.get() == 0 {
            return Err(LedgerStoreError::rejected(LedgerRejection::IdMustNotBeZero));
        }

        let now = self.clock_nanos();
        let mut state = self.lock_state()?;
        if state.accounts.contains_key(&identifier) {
            return Err(LedgerStoreError::rejected(LedgerRejection::Exists));
        }

        let timestamp = now.max(state.last_timestamp.saturating_add(1));
        state.last_timestamp = timestamp;
        let account = LedgerAccount {
            timestamp,
            ..LedgerAccount::zeroed(identifier)
        };
        state.accounts.insert(identifier, account);
        Ok(account)
    }

    async fn lookup(
        &self,
        identifiers: &[AccountIdentifier],
    ) -> Result<Vec<LedgerAccount>, LedgerStoreError> {
        let state = self.lock_state()?;
        Ok(identifiers
            .iter()
            .filter_map(|id| state.accounts.get(id).copied())
            .collect())
    }
}
