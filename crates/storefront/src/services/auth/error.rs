//! Authentication error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::storage::StorageError;

/// Errors that can occur during login or signup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shopfront_core::EmailError),

    /// Signup needs a backend to hold the account.
    #[error("backend not configured")]
    NotConfigured,

    /// The `users` table refused the profile row.
    #[error("Failed to save user ({status}): {body}")]
    ProfileRejected { status: u16, body: String },

    /// Backend transport or decoding failure.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Local store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
