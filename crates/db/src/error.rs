//! Translation of sqlx errors into domain errors.

use onboard_core::error::CoreError;

/// Map a sqlx error onto [`CoreError`].
///
/// - Unique violations (SQLSTATE 23505) on constraints named `uq_*` become
///   [`CoreError::Conflict`].
/// - Everything else becomes [`CoreError::Internal`] carrying the driver's
///   message.
pub fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(err.to_string())
}
