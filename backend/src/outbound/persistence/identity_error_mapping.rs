//! Diesel and pool failures mapped onto [`IdentityStoreError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::IdentityStoreError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> IdentityStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            IdentityStoreError::unavailable(message)
        }
    }
}

/// Unique violations become `AlreadyExists` for `username`; dropped
/// connections become `Unavailable`.
pub(crate) fn map_diesel_error(error: DieselError, username: &str) -> IdentityStoreError {
    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            IdentityStoreError::already_exists(username)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            IdentityStoreError::unavailable("database connection error")
        }
        DieselError::DatabaseError(_, info) => IdentityStoreError::query(info.message()),
        other => IdentityStoreError::query(other.to_string()),
    }
}
