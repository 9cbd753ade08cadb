use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The caller's expected version no longer matches the stored one.
    #[error("Version conflict: expected {expected}, current is {current}")]
    VersionConflict { expected: String, current: String },

    #[error("Payload too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Empty state rejected: the document has no rows, notes or list items")]
    EmptyStateRejected,

    #[error("Internal error: {0}")]
    Internal(String),
}
