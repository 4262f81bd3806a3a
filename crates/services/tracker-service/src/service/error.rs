//! Outcomes reported by domain services.
//!
//! Storage failures are logged with full detail here and surface to callers
//! only as [`ServiceError::Unavailable`] or [`ServiceError::Internal`].

use thiserror::Error;
use uuid::Uuid;

use common::AppError;
use domain::{DomainError, DomainResult};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidState(String),

    /// The store could not be reached; the caller may retry
    #[error("Service temporarily unavailable")]
    Unavailable,

    #[error("Internal server error")]
    Internal,
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        ServiceError::NotFound(entity.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ServiceError::Conflict(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        ServiceError::InvalidState(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::InvalidState(_) => "INVALID_STATE",
            ServiceError::Unavailable => "UNAVAILABLE",
            ServiceError::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Unavailable)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(entity) => ServiceError::NotFound(entity),
            AppError::Conflict(entity) => ServiceError::Conflict(format!("{entity} already exists")),
            AppError::InvalidState(msg) => ServiceError::InvalidState(msg),
            AppError::StorageUnavailable(e) => {
                tracing::error!(error = %e, "Storage unavailable");
                ServiceError::Unavailable
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Storage failure");
                ServiceError::Internal
            }
            AppError::InvalidPrecondition(msg) => {
                tracing::error!(%msg, "Unit of work misuse");
                ServiceError::Internal
            }
            AppError::Internal(msg) => {
                tracing::error!(%msg, "Internal error");
                ServiceError::Internal
            }
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        AppError::from(err).into()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Unwrap a lookup a precondition depends on, logging the rejection.
pub(crate) fn require<T>(found: Option<T>, entity: &str, id: Uuid) -> ServiceResult<T> {
    found.ok_or_else(|| {
        tracing::warn!(entity, %id, "Precondition failed: referenced record not found");
        ServiceError::not_found(entity)
    })
}

/// Reject with [`ServiceError::InvalidState`] and log why.
pub(crate) fn reject<T>(msg: &str) -> ServiceResult<T> {
    tracing::warn!(reason = msg, "Precondition failed");
    Err(ServiceError::invalid_state(msg))
}

/// Report a save rejected by a unique index with the rule it broke.
///
/// A concurrent request may claim the key between the check and the save.
pub(crate) fn conflict_as(msg: &'static str) -> impl FnOnce(AppError) -> ServiceError {
    move |err| match err {
        AppError::Conflict(_) => {
            tracing::warn!(reason = msg, "Save rejected by a unique index");
            ServiceError::conflict(msg)
        }
        other => other.into(),
    }
}

/// Surface a failed business rule, logging it.
pub(crate) fn check(rule: DomainResult<()>) -> ServiceResult<()> {
    rule.map_err(|e| {
        tracing::warn!(reason = %e, "Precondition failed");
        e.into()
    })
}
