//! Field-encryption configuration.

use serde::{Deserialize, Serialize};

use crate::error::SecureResult;

/// What to do with a never-encrypted value found in an encrypted field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyPolicy {
    /// Leave the value as loaded; it is sealed on the next flush.
    #[default]
    PassThrough,
    /// Treat it as a decryption failure.
    Reject,
}

/// Configuration for the transform orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecureConfig {
    /// Profile used by fields that do not declare one
    /// (e.g., "AES-GCM/default-key").
    pub default_profile: Option<String>,

    /// Handling of plain values in encrypted fields on load.
    pub legacy_plaintext: LegacyPolicy,

    /// Re-seal values found under another profile (key rotation). When
    /// disabled such values are reported as profile mismatches.
    pub rekey_foreign_ciphertext: bool,

    /// Bind every ciphertext to its entity type and field path as
    /// associated data. Changing this makes existing values unreadable.
    pub bind_field_context: bool,
}

impl Default for SecureConfig {
    fn default() -> Self {
        Self {
            default_profile: Some("AES-GCM/default-key".to_string()),
            legacy_plaintext: LegacyPolicy::PassThrough,
            rekey_foreign_ciphertext: true,
            bind_field_context: true,
        }
    }
}

impl SecureConfig {
    /// Parses a configuration; absent keys take their default.
    pub fn from_json(json: &str) -> SecureResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Creates a config for testing: strict legacy handling, no rotation.
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            default_profile: Some("AES-GCM/test-key".to_string()),
            legacy_plaintext: LegacyPolicy::Reject,
            rekey_foreign_ciphertext: false,
            bind_field_context: true,
        }
    }
}
