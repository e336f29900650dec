//! Driven port for the identity store keyed by username.

use async_trait::async_trait;

use crate::domain::{UserIdentity, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity store adapters.
    pub enum IdentityStoreError {
        /// An identity with this username is already stored.
        AlreadyExists { username: String } => "identity {username} already exists",
        /// The store could not be reached, or the call timed out.
        Unavailable { message: String } => "identity store unavailable: {message}",
        /// The store answered but the query or mutation failed.
        Query { message: String } => "identity store query failed: {message}",
    }
}

impl IdentityStoreError {
    /// Whether a retry could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Persistence boundary for identity records.
///
/// Uniqueness of `username` is owned by the store: adapters backed by a store
/// with a native unique key must surface its violation as
/// [`IdentityStoreError::AlreadyExists`]; the existence probe inside
/// [`IdentityStore::create`] only short-circuits the common case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Existence probe; an absent username is `Ok(false)`.
    async fn exists(&self, username: &Username) -> Result<bool, IdentityStoreError>;

    /// Store a new identity, failing with `AlreadyExists` without writing
    /// when the username is taken.
    async fn create(&self, identity: &UserIdentity) -> Result<(), IdentityStoreError>;

    /// Fetch an identity by username.
    async fn find(&self, username: &Username) -> Result<Option<UserIdentity>, IdentityStoreError>;

    /// Page through identities ordered by username, starting strictly after
    /// `after` when supplied.
    async fn list_after(
        &self,
        after: Option<Username>,
        limit: usize,
    ) -> Result<Vec<UserIdentity>, IdentityStoreError>;
}
