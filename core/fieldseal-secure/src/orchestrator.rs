//! Per-entity field transformation.
//!
//! The orchestrator walks the classified fields of one entity and seals or
//! opens each value through the cipher engine. It never keeps entity state
//! between calls.

use std::borrow::Cow;
use std::sync::Arc;

use fieldseal_crypto::{CipherEngine, CryptoError, EncryptionProfile, KeyProvider};
use fieldseal_model::{FieldValue, SecureEntity};
use tracing::{debug, trace, warn};

use crate::classifier::{FieldClassifier, FieldDescriptor};
use crate::config::{LegacyPolicy, SecureConfig};
use crate::error::{SecureError, SecureResult};
use crate::registry::SchemaRegistry;
use crate::session::UnitOfWork;

/// Applies field encryption to entities.
///
/// Shared by all units of work of a process (`Send + Sync`); each unit of
/// work gets its own [`UnitOfWork`] from [`begin`](Self::begin).
#[derive(Debug)]
pub struct TransformOrchestrator {
    classifier: FieldClassifier,
    engine: CipherEngine,
    config: SecureConfig,
}

impl TransformOrchestrator {
    pub fn new(
        registry: SchemaRegistry,
        keys: Arc<dyn KeyProvider>,
        config: SecureConfig,
    ) -> SecureResult<Self> {
        Ok(Self {
            classifier: FieldClassifier::new(registry, &config)?,
            engine: CipherEngine::new(keys),
            config,
        })
    }

    /// Starts a unit of work with an empty touch ledger.
    pub fn begin(self: &Arc<Self>) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(self))
    }

    pub fn classifier(&self) -> &FieldClassifier {
        &self.classifier
    }

    pub fn engine(&self) -> &CipherEngine {
        &self.engine
    }

    pub fn config(&self) -> &SecureConfig {
        &self.config
    }

    /// Decrypts every encrypted field of `entity` in place.
    ///
    /// Null fields are skipped. Plain (never-encrypted) values are left as
    /// they are under [`LegacyPolicy::PassThrough`]. Returns the number of
    /// fields decrypted.
    pub fn decrypt_fields<E: SecureEntity + ?Sized>(&self, entity: &mut E) -> SecureResult<usize> {
        let fields = self.classifier.classify(entity.entity_type())?;
        let mut opened = 0;

        for field in fields.iter() {
            let plaintext = match entity.read_field(field.path()) {
                FieldValue::Null => continue,
                FieldValue::Unsupported(kind) => return Err(unsupported(&*entity, field, kind)),
                FieldValue::Text(value) => match self.open_value(entity.entity_type(), field, value)? {
                    Some(plaintext) => plaintext,
                    None => continue,
                },
            };
            entity.write_field(field.path(), plaintext)?;
            opened += 1;
        }

        Ok(opened)
    }

    /// Encrypts every encrypted field of `entity` in place.
    ///
    /// Null fields and fields already sealed under their profile are
    /// skipped, so calling this repeatedly is harmless. Returns the number
    /// of fields whose value changed; a non-zero count means the caller's
    /// change-set for this entity is stale.
    ///
    /// All fields are sealed before any is written back: on error the
    /// entity is left exactly as it was.
    pub fn encrypt_fields<E: SecureEntity + ?Sized>(&self, entity: &mut E) -> SecureResult<usize> {
        let fields = self.classifier.classify(entity.entity_type())?;
        let mut sealed = Vec::with_capacity(fields.len());

        for field in fields.iter() {
            match entity.read_field(field.path()) {
                FieldValue::Null => {
                    if !field.nullable() {
                        debug!(
                            entity_type = %entity.entity_type(),
                            field = %field.path(),
                            "non-nullable encrypted field is null"
                        );
                    }
                }
                FieldValue::Unsupported(kind) => return Err(unsupported(&*entity, field, kind)),
                FieldValue::Text(value) if self.engine.is_ciphertext(field.profile(), value) => {}
                FieldValue::Text(value) => sealed.push((field, self.seal_value(field, value)?)),
            }
        }

        let changed = sealed.len();
        for (field, value) in sealed {
            entity.write_field(field.path(), value)?;
        }
        Ok(changed)
    }

    /// `Ok(None)` means "leave the value untouched".
    fn open_value(
        &self,
        entity_type: &str,
        field: &FieldDescriptor,
        value: &str,
    ) -> SecureResult<Option<String>> {
        match self.engine.open(field.profile(), value, field.aad()) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(CryptoError::NotCiphertext) => match self.config.legacy_plaintext {
                LegacyPolicy::PassThrough => {
                    trace!(entity_type = %entity_type, field = %field.path(), "legacy plaintext left as loaded");
                    Ok(None)
                }
                LegacyPolicy::Reject => {
                    warn!(entity_type = %entity_type, field = %field.path(), "legacy plaintext rejected");
                    Err(CryptoError::NotCiphertext.into())
                }
            },
            Err(CryptoError::ProfileMismatch { .. }) if self.config.rekey_foreign_ciphertext => {
                let (sealed_under, _) = EncryptionProfile::from_envelope(value)?;
                let plaintext = self.engine.open(&sealed_under, value, field.aad())?;
                Ok(Some(plaintext))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn seal_value(&self, field: &FieldDescriptor, value: &str) -> SecureResult<String> {
        let plaintext: Cow<'_, str> = match self.engine.sealed_under(value) {
            // Not an envelope the engine could have produced: plaintext.
            None => Cow::Borrowed(value),
            Some(sealed_under) if self.config.rekey_foreign_ciphertext => {
                debug!(
                    field = %field.path(),
                    from = %sealed_under,
                    to = %field.profile(),
                    "re-sealing value under current profile"
                );
                Cow::Owned(self.engine.open(&sealed_under, value, field.aad())?)
            }
            Some(sealed_under) => {
                return Err(CryptoError::ProfileMismatch {
                    expected: field.profile().to_string(),
                    found: sealed_under.to_string(),
                }
                .into());
            }
        };

        Ok(self.engine.seal(field.profile(), &plaintext, field.aad())?)
    }
}

fn unsupported<E: SecureEntity + ?Sized>(
    entity: &E,
    field: &FieldDescriptor,
    kind: &'static str,
) -> SecureError {
    SecureError::UnsupportedValue {
        entity_type: entity.entity_type().to_string(),
        field: field.path().to_string(),
        kind,
    }
}
