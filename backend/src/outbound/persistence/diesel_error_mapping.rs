//! Diesel and pool error mapping for the market repository.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::MarketRepositoryError;

use super::pool::PoolError;

/// Map pool errors to connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> MarketRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            MarketRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors.
///
/// Unique and foreign-key violations become [`MarketRepositoryError::Conflict`]
/// carrying the violated constraint name; other database messages are only
/// logged.
pub(crate) fn map_diesel_error(error: DieselError) -> MarketRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(
            kind @ (DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation),
            info,
        ) => {
            let constraint = info.constraint_name().unwrap_or("unknown constraint");
            let reason = match kind {
                DatabaseErrorKind::UniqueViolation => "unique",
                _ => "foreign key",
            };
            MarketRepositoryError::conflict(format!("{reason} violation on {constraint}"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            MarketRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => MarketRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => MarketRepositoryError::query("database query error"),
        _ => MarketRepositoryError::query("database error"),
    }
}

/// Failure inside a market write transaction.
#[derive(Debug)]
pub(crate) enum TransactionError {
    Diesel(DieselError),
    /// Subgroups due for a rewrite were deleted after the caller loaded them.
    MissingSubGroups { expected: usize, found: usize },
}

impl From<DieselError> for TransactionError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

/// Fail unless every subgroup queued for a rewrite was still there.
pub(crate) fn ensure_rewritten_rows_present(
    expected: usize,
    found: usize,
) -> Result<(), TransactionError> {
    if found == expected {
        Ok(())
    } else {
        Err(TransactionError::MissingSubGroups { expected, found })
    }
}

/// Map write transaction errors to repository errors.
pub(crate) fn map_transaction_error(error: TransactionError) -> MarketRepositoryError {
    match error {
        TransactionError::Diesel(error) => map_diesel_error(error),
        TransactionError::MissingSubGroups { expected, found } => {
            debug!(expected, found, "subgroups vanished before their rewrite");
            MarketRepositoryError::conflict(format!(
                "{} of {expected} edited subgroups no longer exist",
                expected.saturating_sub(found)
            ))
        }
    }
}
