use crate::types::DbId;

/// Failures raised by the pre-execution validation pipeline.
///
/// All four kinds are detected before any job row is created and map to a
/// 400 response with a stable error code in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Input is not well-formed JSON (including unterminated structures).
    #[error("Invalid JSON: {0}")]
    Parse(String),

    /// A required field is missing or has the wrong shape/type/enum value.
    /// `path` identifies the offending location, e.g. `datasets[0].ns`.
    #[error("Schema validation failed at {path}: {message}")]
    Schema { path: String, message: String },

    /// Structurally valid but semantically inconsistent data: mismatched
    /// array lengths, non-positive counts, or out-of-range incidences.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// A requested model name does not belong to the dataset type's set.
    #[error("Model incompatible with dataset type: {0}")]
    Compatibility(String),
}

/// Domain errors shared across crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}
