use reviewglobe_core::error::CoreError;
use reviewglobe_core::types::DbId;

/// Failure of a single store operation. None of these are fatal: the cached
/// snapshot stays intact and the caller may simply retry the action.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A mutation was attempted without a signed-in identity.
    #[error("You must be logged in to change reviews")]
    AuthRequired,

    /// The payload was rejected before any backend call was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Review not found with id {id}")]
    NotFound { id: DbId },

    /// The backend's access policy refused the change.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Another mutation of the same review is still in flight.
    #[error("Review {id} is already being modified")]
    Busy { id: DbId },

    /// The backend read or write failed; carries the backend's message.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => StoreError::Validation(msg),
            CoreError::NotFound { id, .. } => StoreError::NotFound { id },
            CoreError::Unauthorized(_) => StoreError::AuthRequired,
            CoreError::Forbidden(msg) => StoreError::Forbidden(msg),
            CoreError::Conflict(msg) | CoreError::Internal(msg) => StoreError::Persistence(msg),
        }
    }
}
