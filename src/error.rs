//! Error types for the libris core

use thiserror::Error;

/// Main application error type
///
/// Everything the catalog, circulation, and reporting services can surface.
/// An embedding gateway maps these onto its own transport; inside the crate
/// the variant is the contract.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed caller input; the request itself must change.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business-key collision on create or update (student_id / isbn).
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Referenced record does not exist, or a loan is not in the expected
    /// state for the operation.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No copies left on the shelf to issue.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The operation would break referential integrity, e.g. deleting a
    /// student who still has books out.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying persistence failure: connection loss, lock timeouts, and
    /// constraint violations not otherwise classified.
    #[error("Storage error: {0}")]
    Storage(#[source] sqlx::Error),

    /// Schema migration failure while opening the database.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(entity: &str, key: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} {} not found", entity, key))
    }

    pub fn duplicate(field: &str, value: impl std::fmt::Display) -> Self {
        AppError::Duplicate(format!("{} '{}' already exists", field, value))
    }
}

/// Constraint violations can slip past the explicit service-layer probes
/// when two writers race; classify them instead of reporting a raw
/// storage failure.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return AppError::Duplicate(db_err.message().to_string());
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return AppError::Conflict(db_err.message().to_string());
                }
                _ => {}
            }
        }
        AppError::Storage(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
