//! Diesel and pool error mapping for the relational donor store.

use tracing::debug;

use crate::domain::ports::DonorStoreError;
use crate::outbound::pool::PoolError;

/// Pool failures always mean the database is unreachable or shut down.
pub(crate) fn map_pool_error(error: PoolError) -> DonorStoreError {
    DonorStoreError::connection(error.to_string())
}

/// Map Diesel failures, keeping the operation name for the diagnostic.
///
/// Lost connections become [`DonorStoreError::Connection`]; everything else
/// is a query failure.
pub(crate) fn map_diesel_error(
    error: diesel::result::Error,
    operation: &'static str,
) -> DonorStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        other => debug!(error = %other, operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            info,
        ) => DonorStoreError::connection(format!("{operation}: {}", info.message())),
        DieselError::NotFound => DonorStoreError::query(format!("{operation}: record not found")),
        DieselError::DatabaseError(_, info) => {
            DonorStoreError::query(format!("{operation}: {}", info.message()))
        }
        other => DonorStoreError::query(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );

        let mapped = map_diesel_error(error, "insert donor");

        assert_eq!(
            mapped,
            DonorStoreError::connection("insert donor: server closed the connection")
        );
    }

    #[rstest]
    fn check_violations_map_to_query_errors() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("violates check constraint".to_owned()),
        );

        let mapped = map_diesel_error(error, "insert donor");

        assert!(matches!(mapped, DonorStoreError::Query { .. }));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let mapped = map_diesel_error(DieselError::NotFound, "read stats");
        assert_eq!(
            mapped,
            DonorStoreError::query("read stats: record not found")
        );
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let mapped = map_pool_error(PoolError::Closed);
        assert!(matches!(mapped, DonorStoreError::Connection { .. }));
    }
}
