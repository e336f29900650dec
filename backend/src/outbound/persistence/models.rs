//! Row structs for `user_identities`. Never exposed outside persistence.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{AccountIdentifier, CredentialDigest, EmailAddress, UserIdentity, Username};

use super::schema::user_identities;

/// Reinterpret the identifier's bits as a signed column value.
pub(crate) const fn identifier_to_column(identifier: AccountIdentifier) -> i64 {
    i64::from_ne_bytes(identifier.get().to_ne_bytes())
}

/// Inverse of [`identifier_to_column`].
pub(crate) const fn identifier_from_column(column: i64) -> AccountIdentifier {
    AccountIdentifier::new(u64::from_ne_bytes(column.to_ne_bytes()))
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IdentityRow {
    pub username: String,
    pub identifier: i64,
    pub email: String,
    pub credential_digest: String,
    #[expect(dead_code, reason = "audit column, not part of the domain record")]
    pub created_at: DateTime<Utc>,
}

impl IdentityRow {
    /// Rebuild the domain record, re-validating stored text.
    pub(crate) fn into_identity(self) -> Result<UserIdentity, String> {
        let username = Username::new(&self.username)
            .map_err(|err| format!("stored username {:?} is invalid: {err}", self.username))?;
        let email = EmailAddress::new(&self.email)
            .map_err(|err| format!("stored email for {username} is invalid: {err}"))?;
        Ok(UserIdentity::new(
            username,
            email,
            identifier_from_column(self.identifier),
            CredentialDigest::new(self.credential_digest),
        ))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_identities)]
pub(crate) struct NewIdentityRow<'a> {
    pub username: &'a str,
    pub identifier: i64,
    pub email: &'a str,
    pub credential_digest: &'a str,
}

impl<'a> From<&'a UserIdentity> for NewIdentityRow<'a> {
    fn from(identity: &'a UserIdentity) -> Self {
        Self {
            username: identity.username().as_str(),
            identifier: identifier_to_column(identity.identifier()),
            email: identity.email().as_str(),
            credential_digest: identity.credential_digest().as_str(),
        }
    }
}
