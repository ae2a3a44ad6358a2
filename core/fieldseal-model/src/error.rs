//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur when describing or accessing entity fields.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A field path could not be parsed.
    #[error("invalid field path {path:?}: {reason}")]
    InvalidFieldPath { path: String, reason: String },

    /// A value could not be written back to the entity.
    #[error("field not writable: {0}")]
    FieldNotWritable(String),

    /// Schema (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
