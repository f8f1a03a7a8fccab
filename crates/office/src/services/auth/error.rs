//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::{OfficeError, ValidationError};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password, unknown user or deactivated user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password rejected before hashing.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The stored hash is not a PHC string this build can read.
    #[error("stored password hash is malformed")]
    MalformedHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<AuthError> for OfficeError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::WeakPassword(message) => {
                Self::Validation(ValidationError::new("password", message))
            }
            AuthError::InvalidCredentials => Self::Unauthenticated,
            AuthError::Repository(e) => e.into(),
            AuthError::PasswordHash | AuthError::MalformedHash => {
                tracing::error!(error = %err, "Password hashing failed");
                Self::Storage
            }
        }
    }
}
