//! Error types for the field-encryption core.

use fieldseal_crypto::CryptoError;
use fieldseal_model::ModelError;
use thiserror::Error;

/// Result type for field-encryption operations.
pub type SecureResult<T> = Result<T, SecureError>;

/// Errors surfaced to the persistence layer.
///
/// Nothing here is retried by the core.
#[derive(Debug, Error)]
pub enum SecureError {
    /// Encrypted-field metadata for a type is malformed.
    #[error("classification failed for {entity_type}: {reason}")]
    Classification { entity_type: String, reason: String },

    /// Key resolution, decryption or encryption failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A field could not be read or written back.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An encrypted field holds a value that is neither null nor text.
    #[error("unsupported {kind} value in encrypted field {field} of {entity_type}")]
    UnsupportedValue {
        entity_type: String,
        field: String,
        kind: &'static str,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration or schema (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SecureError {
    pub(crate) fn classification(entity_type: &str, reason: impl Into<String>) -> Self {
        Self::Classification {
            entity_type: entity_type.to_string(),
            reason: reason.into(),
        }
    }

    /// True if key material could not be located.
    pub fn is_key_resolution(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::KeyResolution(_)))
    }

    /// True for authentication failures, corrupt envelopes, profile
    /// mismatches and rejected legacy plaintext.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::Crypto(e) if e.is_decryption_failure())
    }
}
