//! Shared Diesel error mapping for the ledger and account adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{AccountRepositoryError, LedgerRepositoryError};

use super::models::RowDecodeError;
use super::pool::PoolError;

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

impl From<PoolError> for LedgerRepositoryError {
    fn from(error: PoolError) -> Self {
        Self::connection(pool_error_message(error))
    }
}

impl From<PoolError> for AccountRepositoryError {
    fn from(error: PoolError) -> Self {
        Self::connection(pool_error_message(error))
    }
}

/// PostgreSQL's message for SQLSTATE 40P01. Diesel reports deadlocks as
/// `DatabaseErrorKind::Unknown` and does not expose the SQLSTATE.
const DEADLOCK_MESSAGE: &str = "deadlock detected";

/// Serialization failures and deadlocks are surfaced as retryable conflicts.
impl From<DieselError> for LedgerRepositoryError {
    fn from(error: DieselError) -> Self {
        log_diesel_error(&error);
        match error {
            DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
                Self::conflict(info.message().to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::Unknown, info)
                if info.message().starts_with(DEADLOCK_MESSAGE) =>
            {
                Self::conflict(info.message().to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::connection("database connection error")
            }
            DieselError::NotFound => Self::query("record not found"),
            DieselError::QueryBuilderError(_) => Self::query("database query error"),
            _ => Self::query("database error"),
        }
    }
}

impl From<DieselError> for AccountRepositoryError {
    fn from(error: DieselError) -> Self {
        log_diesel_error(&error);
        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::connection("database connection error")
            }
            DieselError::NotFound => Self::query("record not found"),
            _ => Self::query("database error"),
        }
    }
}

impl From<RowDecodeError> for LedgerRepositoryError {
    fn from(error: RowDecodeError) -> Self {
        Self::query(error.to_string())
    }
}

impl From<RowDecodeError> for AccountRepositoryError {
    fn from(error: RowDecodeError) -> Self {
        Self::query(error.to_string())
    }
}
