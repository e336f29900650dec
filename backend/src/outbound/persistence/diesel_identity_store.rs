//! PostgreSQL-backed [`IdentityStore`] using Diesel.
//!
//! The `username` primary key is the uniqueness authority: the existence
//! probe in `create` only avoids a doomed insert, and a racing insert still
//! fails with `AlreadyExists` through the unique violation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{IdentityStore, IdentityStoreError};
use crate::domain::{UserIdentity, Username};

use super::identity_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{IdentityRow, NewIdentityRow};
use super::pool::DbPool;
use super::schema::user_identities;

/// Diesel implementation of the identity store port.
#[derive(Clone)]
pub struct DieselIdentityStore {
    pool: DbPool,
}

impl DieselIdentityStore {
    /// Create a store checking connections out of `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_identity(row: IdentityRow) -> Result<UserIdentity, IdentityStoreError> {
    row.into_identity().map_err(IdentityStoreError::query)
}

/// Page size as a SQL `LIMIT`; oversized requests saturate.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl IdentityStore for DieselIdentityStore {
    async fn exists(&self, username: &Username) -> Result<bool, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            user_identities::table.filter(user_identities::username.eq(username.as_str())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, username.as_str()))
    }

    async fn create(&self, identity: &UserIdentity) -> Result<(), IdentityStoreError> {
        let username = identity.username();
        if self.exists(username).await? {
            return Err(IdentityStoreError::already_exists(username.as_str()));
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(user_identities::table)
            .values(NewIdentityRow::from(identity))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, username.as_str()))?;

        debug!(%username, identifier = %identity.identifier(), "identity row inserted");
        Ok(())
    }

    async fn find(&self, username: &Username) -> Result<Option<UserIdentity>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<IdentityRow> = user_identities::table
            .filter(user_identities::username.eq(username.as_str()))
            .select(IdentityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, username.as_str()))?;

        row.map(row_to_identity).transpose()
    }

    async fn list_after(
        &self,
        after: Option<Username>,
        limit: usize,
    ) -> Result<Vec<UserIdentity>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = user_identities::table
            .select(IdentityRow::as_select())
            .order(user_identities::username.asc())
            .limit(sql_limit(limit))
            .into_boxed();
        if let Some(cursor) = &after {
            query = query.filter(user_identities::username.gt(cursor.as_str().to_owned()));
        }

        let rows: Vec<IdentityRow> = query
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, after.as_ref().map_or("", Username::as_str)))?;

        rows.into_iter().map(row_to_identity).collect()
    }
}
