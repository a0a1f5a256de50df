//! Domain error types.

use thiserror::Error;

/// Failure of the underlying key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Errors produced by domain operations.
///
/// All variants are recoverable and meant to be reported to the caller.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient seats: {available} available, {requested} requested")]
    InsufficientSeats { available: u32, requested: u32 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Schema-level errors are reported under the "__all__" pseudo-field
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();

        messages.sort();
        let message = match messages.len() {
            0 => "Invalid input".to_string(),
            1 => messages.remove(0),
            _ => messages.join("; "),
        };
        DomainError::Validation(message)
    }
}

impl From<shared::password::PasswordError> for DomainError {
    fn from(err: shared::password::PasswordError) -> Self {
        DomainError::Internal(err.to_string())
    }
}
