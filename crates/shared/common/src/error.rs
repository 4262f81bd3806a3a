//! Unified error handling.
//!
//! Every fallible operation in the workspace returns [`AppResult`]. The
//! variants follow the storage taxonomy: not-found, conflict, invalid state,
//! invalid precondition, transient storage failure and fatal storage failure.

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    // Business rules
    #[error("{0}")]
    InvalidState(String),

    /// API misuse, e.g. committing without an active transaction
    #[error("Invalid precondition: {0}")]
    InvalidPrecondition(String),

    // Storage errors
    /// The store could not be reached. Retrying may succeed.
    #[cfg(feature = "database")]
    #[error("Storage unavailable")]
    StorageUnavailable(#[source] sea_orm::DbErr),

    /// The store rejected the operation for a reason retrying won't fix.
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[source] sea_orm::DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::InvalidPrecondition(_) => "INVALID_PRECONDITION",
            #[cfg(feature = "database")]
            AppError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may retry the operation unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            #[cfg(feature = "database")]
            AppError::StorageUnavailable(_) => true,
            _ => false,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::NotFound(_) | AppError::Conflict(_) => self.to_string(),
            AppError::InvalidState(msg) => msg.clone(),

            // Hide details for internal errors
            AppError::InvalidPrecondition(msg) => {
                tracing::error!("Invalid precondition: {}", msg);
                "An internal error occurred".to_string()
            }
            #[cfg(feature = "database")]
            AppError::StorageUnavailable(e) => {
                tracing::error!("Storage unavailable: {:?}", e);
                "The service is temporarily unavailable".to_string()
            }
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }
}

// =============================================================================
// Storage Error Conversion
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        use sea_orm::{DbErr, SqlErr};

        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(%detail, "Unique constraint violated");
                return AppError::Conflict("Record".to_string());
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::debug!(%detail, "Foreign key constraint violated");
                return AppError::InvalidState("Referenced record does not exist".to_string());
            }
            _ => {}
        }

        if is_transient(&err) {
            return AppError::StorageUnavailable(err);
        }

        match err {
            DbErr::RecordNotFound(entity) => AppError::NotFound(entity),
            DbErr::RecordNotUpdated => AppError::NotFound("Record".to_string()),
            other => AppError::Database(other),
        }
    }
}

/// Lost connections, exhausted pools and I/O failures mid-statement.
#[cfg(feature = "database")]
fn is_transient(err: &sea_orm::DbErr) -> bool {
    use sea_orm::{sqlx, DbErr, RuntimeErr};

    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Query(RuntimeErr::SqlxError(e)) | DbErr::Exec(RuntimeErr::SqlxError(e)) => matches!(
            e,
            sqlx::Error::Io(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        ),
        _ => false,
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidState(msg) => AppError::InvalidState(msg),
            DomainError::Password(msg) => AppError::InvalidState(msg),
            DomainError::NotFound(entity) => AppError::NotFound(entity),
            DomainError::Conflict(entity) => AppError::Conflict(entity),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(entity.to_string()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        AppError::InvalidState(msg.into())
    }

    pub fn invalid_precondition(msg: impl Into<String>) -> Self {
        AppError::InvalidPrecondition(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
