use serde::{Deserialize, Serialize};

use crate::error::ModelResult;

/// Declares which fields of an entity type are encrypted at rest.
///
/// Registered once per type by the host; the classifier turns it into
/// resolved field descriptors and caches the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    #[serde(default)]
    pub encrypted_fields: Vec<EncryptedField>,
}

impl EntitySchema {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            encrypted_fields: Vec::new(),
        }
    }

    /// Builder-style: append an encrypted field declaration.
    pub fn field(mut self, field: EncryptedField) -> Self {
        self.encrypted_fields.push(field);
        self
    }

    /// Parses a schema from its JSON form.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A single encrypted field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    /// JSON pointer (e.g. "/ssn") or bare field name.
    pub field_path: String,
    /// Profile identifier such as `"AES-GCM/default-key"`. When absent the
    /// configured default profile applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl EncryptedField {
    /// Shorthand for a nullable field under the default profile.
    pub fn new(path: &str) -> Self {
        Self {
            field_path: path.into(),
            profile: None,
            nullable: true,
        }
    }

    /// Shorthand for a nullable field under an explicit profile.
    pub fn with_profile(path: &str, profile: &str) -> Self {
        Self {
            field_path: path.into(),
            profile: Some(profile.into()),
            nullable: true,
        }
    }

    /// Marks the field as non-nullable.
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}
