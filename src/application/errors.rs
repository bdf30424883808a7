//! Application-level error umbrella
//!
//! Domain and infrastructure errors stay tagged; mapping to transport status
//! codes happens at the presentation boundary only.

use thiserror::Error;

use crate::domain::auth::{AuthError, StorageError};

/// Errors surfaced by application use cases
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
