//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use study_core::model::{GoalError, ScopeError, StudySessionError};

/// Errors emitted by `GoalService`.
///
/// A missing or foreign goal is not an error; operations return `None`/`false`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GoalServiceError {
    #[error(transparent)]
    Goal(#[from] GoalError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("limit must be greater than zero")]
    InvalidLimit,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GoalServiceError {
    /// True for caller mistakes that were rejected before touching storage.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GoalServiceError::Goal(_) | GoalServiceError::Scope(_) | GoalServiceError::InvalidLimit
        )
    }
}

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionServiceError {
    #[error(transparent)]
    Session(#[from] StudySessionError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("limit must be greater than zero")]
    InvalidLimit,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionServiceError {
    /// True for caller mistakes that were rejected before touching storage.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SessionServiceError::Session(_)
                | SessionServiceError::Scope(_)
                | SessionServiceError::InvalidLimit
        )
    }
}

/// Errors emitted by `AnalyticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalyticsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
