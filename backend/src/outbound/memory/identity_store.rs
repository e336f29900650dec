//! [`IdentityStore`] over a username-ordered map.
//!
//! The check-and-insert in `create` runs under one write lock, so the
//! username stays unique under concurrent signups.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{IdentityStore, IdentityStoreError};
use crate::domain::{UserIdentity, Username};

/// Identity store held in process memory; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    identities: RwLock<BTreeMap<String, UserIdentity>>,
}

impl InMemoryIdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn exists(&self, username: &Username) -> Result<bool, IdentityStoreError> {
        Ok(self.identities.read().await.contains_key(username.as_str()))
    }

    async fn create(&self, identity: &UserIdentity) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        let key = identity.username().as_str();
        if identities.contains_key(key) {
            return Err(IdentityStoreError::already_exists(key));
        }
        identities.insert(key.to_owned(), identity.clone());
        Ok(())
    }

    async fn find(&self, username: &Username) -> Result<Option<UserIdentity>, IdentityStoreError> {
        Ok(self.identities.read().await.get(username.as_str()).cloned())
    }

    async fn list_after(
        &self,
        after: Option<Username>,
        limit: usize,
    ) -> Result<Vec<UserIdentity>, IdentityStoreError> {
        use std::ops::Bound;

        let identities = self.identities.read().await;
        let lower = match &after {
            Some(cursor) => Bound::Excluded(cursor.as_str().to_owned()),
            None => Bound::Unbounded,
        };
        Ok(identities
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, identity)| identity.clone())
            .collect())
    }
}
