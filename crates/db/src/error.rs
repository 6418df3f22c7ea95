//! Mapping from sqlx errors to store port errors.

use salon_core::ports::StoreError;

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Classify a sqlx error for the core.
///
/// Unique and exclusion violations become [`StoreError::Conflict`];
/// everything else is a backend failure.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(EXCLUSION_VIOLATION) => {
                return StoreError::Conflict("Stylist is already booked at this time".into());
            }
            Some(UNIQUE_VIOLATION) => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return StoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}
