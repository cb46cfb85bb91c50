//! Unified error type for the service layer
//!
//! Every failure flattens to a human-readable message at the surface.
//! Nothing is retried: a failed user action is terminal and must be
//! re-triggered. Validation errors are raised before any store call.

use crewtask_shared::models::User;
use crewtask_store::auth::AuthError;
use crewtask_store::StoreError;

/// Service result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Unified service error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input failed validation before any store call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Caller lacks the required role
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Authentication failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Requires the actor to be an admin
pub(crate) fn require_admin(actor: &User) -> AppResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin role required".to_string()))
    }
}

/// Flattens validator output into one human-readable line
pub(crate) fn flatten_validation(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs {
            match &err.message {
                Some(msg) => parts.push(msg.to_string()),
                None => parts.push(format!("{} is invalid", field)),
            }
        }
    }
    parts.join("; ")
}
