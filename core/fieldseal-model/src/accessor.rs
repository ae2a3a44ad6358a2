use std::fmt;

use crate::error::ModelResult;
use crate::path::FieldPath;

/// The current content of an encrypted field, as seen by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// The field is null or absent. Never passed to the cipher.
    Null,
    /// A textual value: plaintext, legacy plaintext, or an envelope.
    Text(&'a str),
    /// A value the core cannot transform (number, object, ...).
    Unsupported(&'static str),
}

/// Typed access to the encrypted fields of a persisted record.
///
/// The classifier resolves each declared field to a [`FieldPath`] once per
/// entity type; implementations only have to map that path onto their own
/// storage. Struct-backed entities usually match on [`FieldPath::name`].
pub trait SecureEntity {
    /// The entity type name the schema was registered under.
    fn entity_type(&self) -> &str;

    /// The identity of this instance within its type.
    fn entity_id(&self) -> &str;

    /// Reads the field at `path`.
    fn read_field(&self, path: &FieldPath) -> FieldValue<'_>;

    /// Replaces the textual value at `path`.
    ///
    /// Only called for paths that just returned [`FieldValue::Text`].
    fn write_field(&mut self, path: &FieldPath, value: String) -> ModelResult<()>;

    /// Convenience: the (type, identity) pair.
    fn entity_key(&self) -> EntityKey {
        EntityKey::new(self.entity_type(), self.entity_id())
    }
}

/// Identifies one entity instance across types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub entity_type: String,
    pub entity_id: String,
}

impl EntityKey {
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity_type, self.entity_id)
    }
}
