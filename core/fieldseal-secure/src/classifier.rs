//! Field classification.
//!
//! Turns an entity type's [`EntitySchema`] into an ordered list of resolved
//! [`FieldDescriptor`]s: parsed field path, parsed profile and the
//! associated data every ciphertext of that field is bound to. The result
//! is computed once per type and shared through an `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use fieldseal_crypto::EncryptionProfile;
use fieldseal_model::{EncryptedField, EntitySchema, FieldPath, SecureEntity};
use tracing::debug;

use crate::config::SecureConfig;
use crate::error::{SecureError, SecureResult};
use crate::registry::SchemaRegistry;

/// One encrypted field of an entity type, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    path: FieldPath,
    profile: EncryptionProfile,
    nullable: bool,
    aad: Vec<u8>,
}

impl FieldDescriptor {
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// The leaf field name.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn profile(&self) -> &EncryptionProfile {
        &self.profile
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Associated data bound to every ciphertext of this field.
    pub fn aad(&self) -> &[u8] {
        &self.aad
    }
}

/// Resolved descriptors of one entity type, in declaration order.
pub type FieldSet = Arc<[FieldDescriptor]>;

/// Classifies entity types and caches the result for the process lifetime.
///
/// Safe to share between threads. Two threads racing on the first
/// classification of a type may both compute it; the first insert wins and
/// both get the same `Arc`.
#[derive(Debug)]
pub struct FieldClassifier {
    registry: SchemaRegistry,
    default_profile: Option<EncryptionProfile>,
    bind_field_context: bool,
    cache: RwLock<HashMap<String, FieldSet>>,
}

impl FieldClassifier {
    pub fn new(registry: SchemaRegistry, config: &SecureConfig) -> SecureResult<Self> {
        let default_profile = config
            .default_profile
            .as_deref()
            .map(str::parse::<EncryptionProfile>)
            .transpose()
            .map_err(|e| SecureError::Config(format!("default_profile: {e}")))?;

        Ok(Self {
            registry,
            default_profile,
            bind_field_context: config.bind_field_context,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the encrypted fields of `entity_type`.
    ///
    /// Types without a registered schema have no encrypted fields.
    pub fn classify(&self, entity_type: &str) -> SecureResult<FieldSet> {
        if let Some(fields) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity_type)
        {
            return Ok(Arc::clone(fields));
        }

        let fields: FieldSet = match self.registry.get(entity_type) {
            Some(schema) => self.resolve(schema)?.into(),
            None => Arc::from([]),
        };
        debug!(entity_type = %entity_type, fields = fields.len(), "classified entity type");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let cached = cache.entry(entity_type.to_string()).or_insert(fields);
        Ok(Arc::clone(cached))
    }

    /// Classifies the type of a concrete entity.
    pub fn classify_entity<E: SecureEntity + ?Sized>(&self, entity: &E) -> SecureResult<FieldSet> {
        self.classify(entity.entity_type())
    }

    /// True if `entity_type` has at least one encrypted field.
    pub fn is_secured(&self, entity_type: &str) -> SecureResult<bool> {
        Ok(!self.classify(entity_type)?.is_empty())
    }

    /// Entity types classified so far.
    pub fn cached_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        types.sort();
        types
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn resolve(&self, schema: &EntitySchema) -> SecureResult<Vec<FieldDescriptor>> {
        let entity_type = schema.entity_type.as_str();
        let mut seen = HashSet::new();

        schema
            .encrypted_fields
            .iter()
            .map(|field| {
                let descriptor = self.resolve_field(entity_type, field)?;
                if !seen.insert(descriptor.path.segments().to_vec()) {
                    return Err(SecureError::classification(
                        entity_type,
                        format!("field {} declared twice", field.field_path),
                    ));
                }
                Ok(descriptor)
            })
            .collect()
    }

    fn resolve_field(&self, entity_type: &str, field: &EncryptedField) -> SecureResult<FieldDescriptor> {
        let path = FieldPath::parse(&field.field_path)
            .map_err(|e| SecureError::classification(entity_type, e.to_string()))?;

        let profile = match (&field.profile, &self.default_profile) {
            (Some(raw), _) => raw
                .parse::<EncryptionProfile>()
                .map_err(|e| SecureError::classification(entity_type, format!("{path}: {e}")))?,
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(SecureError::classification(
                    entity_type,
                    format!("{path}: no profile declared and no default profile configured"),
                ));
            }
        };

        let aad = if self.bind_field_context {
            format!("{entity_type}#{path}").into_bytes()
        } else {
            Vec::new()
        };

        Ok(FieldDescriptor {
            path,
            profile,
            nullable: field.nullable,
            aad,
        })
    }
}
