//! Error types for the cipher engine.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// No key material is available for a key reference.
    #[error("key resolution failed: {0}")]
    KeyResolution(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key, tampered data, corrupt encoding).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The value carries no envelope marker at all (plain text).
    #[error("decryption failed: value is not ciphertext")]
    NotCiphertext,

    /// The value is an envelope sealed under a different profile.
    #[error("decryption failed: sealed under profile {found}, expected {expected}")]
    ProfileMismatch { expected: String, found: String },

    /// A profile identifier could not be parsed.
    #[error("invalid profile {profile:?}: {reason}")]
    InvalidProfile { profile: String, reason: String },

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}

impl CryptoError {
    /// True for every failure of the decrypt direction other than key
    /// resolution: unmarked values, profile mismatches and authentication
    /// or decoding failures.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self,
            Self::Decryption(_) | Self::NotCiphertext | Self::ProfileMismatch { .. }
        )
    }
}
