use crate::types::DbId;

/// Domain failures shared by every layer.
///
/// The API maps each variant to one HTTP status; see `AppError` there.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An outing, group, participant or membership does not exist in the
    /// requested scope.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Malformed input, e.g. a blank group name, inverted size bounds or an
    /// adult placed in a tent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request is well-formed but clashes with current state: a taken
    /// group name, an already-assigned participant, a stale auto-assign plan.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
