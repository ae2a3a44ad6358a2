//! Registry of entity schemas.
//!
//! Built by the host at startup and then moved into the classifier, after
//! which it can no longer change: type metadata is immutable for the
//! process lifetime, which is what makes caching classifications safe.

use std::collections::HashMap;

use fieldseal_model::EntitySchema;

use crate::error::{SecureError, SecureResult};

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, EntitySchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema. Each entity type may be registered once.
    pub fn register(&mut self, schema: EntitySchema) -> SecureResult<()> {
        if self.schemas.contains_key(&schema.entity_type) {
            return Err(SecureError::classification(
                &schema.entity_type,
                "schema registered twice",
            ));
        }
        self.schemas.insert(schema.entity_type.clone(), schema);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, schema: EntitySchema) -> SecureResult<Self> {
        self.register(schema)?;
        Ok(self)
    }

    /// Loads a JSON array of schemas.
    pub fn from_json(json: &str) -> SecureResult<Self> {
        let schemas: Vec<EntitySchema> = serde_json::from_str(json)?;
        schemas
            .into_iter()
            .try_fold(Self::new(), |registry, schema| registry.with(schema))
    }

    pub fn get(&self, entity_type: &str) -> Option<&EntitySchema> {
        self.schemas.get(entity_type)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
