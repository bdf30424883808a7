//! Authentication and storage domain errors

use thiserror::Error;

/// Authentication-specific domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("An account with this email already exists: {email}")]
    DuplicateIdentity { email: String },

    #[error("Invalid credentials provided")]
    InvalidCredentials,

    #[error("Invalid token provided")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Email and password are required")]
    MissingFields,

    #[error("Invalid email format: {email}")]
    InvalidEmail { email: String },

    #[error("Password hashing failed")]
    HashingFailed,
}

/// Errors surfaced by the persistent store.
///
/// Anything other than `NotFound`/`DuplicateEmail` is treated as an internal
/// failure and the request fails closed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("store I/O failed: {0}")]
    Io(String),

    #[error("store serialization failed: {0}")]
    Serialization(String),

    #[error("store I/O timed out after {0} seconds")]
    Timeout(u64),
}
