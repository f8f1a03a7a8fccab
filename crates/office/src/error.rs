//! Unified error handling for the office core.
//!
//! Repositories report [`RepositoryError`]s, which can carry raw driver
//! errors. Everything exposed to callers goes through [`OfficeError`], where
//! storage failures are logged once and reduced to an opaque
//! [`OfficeError::Storage`].

use thiserror::Error;

use crate::db::RepositoryError;

/// Malformed or missing input, detected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Input field the message refers to.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Build a validation error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// The standard "is required" message.
    #[must_use]
    pub fn required(field: &'static str) -> Self {
        Self::new(field, "is required")
    }
}

/// Error type returned by every caller-facing operation.
#[derive(Debug, Error)]
pub enum OfficeError {
    /// Input rejected before any write.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A unique value is already taken.
    #[error("Conflict: {field} '{value}' already exists")]
    Conflict {
        /// Column that must be unique (e.g. `case_number`).
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A referenced row is missing, or dependents block a delete.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// No user is logged in.
    #[error("Unauthorized: login required")]
    Unauthenticated,

    /// The logged-in user's role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    /// Storage or I/O failure. Details are logged, not returned.
    #[error("Storage error: the operation could not be completed")]
    Storage,
}

impl OfficeError {
    /// Whether the user can fix the problem by changing their input.
    #[must_use]
    pub const fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Conflict { .. } | Self::Integrity(_)
        )
    }
}

impl From<RepositoryError> for OfficeError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => Self::Validation(e),
            RepositoryError::Conflict { field, value } => Self::Conflict { field, value },
            RepositoryError::Integrity(message) => Self::Integrity(message),
            RepositoryError::NotFound(what) => Self::NotFound(what),
            storage @ (RepositoryError::Database(_)
            | RepositoryError::Migration(_)
            | RepositoryError::Io(_)
            | RepositoryError::DataCorruption(_)) => {
                tracing::error!(error = %storage, "Storage operation failed");
                Self::Storage
            }
        }
    }
}
