use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::accessor::{FieldValue, SecureEntity};
use crate::error::{ModelError, ModelResult};
use crate::path::FieldPath;

/// A generic persisted record.
///
/// The `data` field holds arbitrary JSON whose encrypted members are
/// declared by the entity type's [`EntitySchema`](crate::EntitySchema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: String,
    pub data: Value,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            data,
        }
    }

    /// Extract a string value from `data` using a JSON pointer (e.g., "/ssn").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(|v| v.as_str())
    }

    /// True if the pointer resolves to JSON `null` or nothing at all.
    pub fn is_null(&self, pointer: &str) -> bool {
        self.data.pointer(pointer).is_none_or(Value::is_null)
    }
}

impl SecureEntity for Entity {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn entity_id(&self) -> &str {
        &self.id
    }

    fn read_field(&self, path: &FieldPath) -> FieldValue<'_> {
        match path.get(&self.data) {
            None | Some(Value::Null) => FieldValue::Null,
            Some(Value::String(s)) => FieldValue::Text(s),
            Some(Value::Bool(_)) => FieldValue::Unsupported("bool"),
            Some(Value::Number(_)) => FieldValue::Unsupported("number"),
            Some(Value::Array(_)) => FieldValue::Unsupported("array"),
            Some(Value::Object(_)) => FieldValue::Unsupported("object"),
        }
    }

    fn write_field(&mut self, path: &FieldPath, value: String) -> ModelResult<()> {
        let slot = path
            .get_mut(&mut self.data)
            .ok_or_else(|| ModelError::FieldNotWritable(path.to_string()))?;
        *slot = Value::String(value);
        Ok(())
    }
}
