//! Authentication error types.

use thiserror::Error;

/// Errors that can occur when talking to the hosted auth provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] forall_herbals_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A required signup field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Access token missing, expired, or rejected by the provider.
    #[error("invalid or expired access token")]
    InvalidToken,

    /// Provider returned an unexpected error response.
    #[error("auth provider error: {status} - {message}")]
    Provider { status: u16, message: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
