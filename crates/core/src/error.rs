use crate::types::DbId;

/// Domain-level error shared by every layer of the service.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
