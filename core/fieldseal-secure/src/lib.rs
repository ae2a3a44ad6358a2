//! Transparent field-level encryption for persisted entities.
//!
//! Sits between a persistence layer and its entities: encrypted fields are
//! decrypted after load and sealed again just before their changes are
//! written.
//!
//! - [`FieldClassifier`]: which fields of a type are encrypted, and how
//! - [`TransformOrchestrator`]: seals/opens the fields of one entity
//! - [`TouchLedger`]: which entities a unit of work has encrypted
//! - [`UnitOfWork`]: the load / flush / post-flush hooks of one commit
//!
//! ```ignore
//! let registry = SchemaRegistry::new()
//!     .with(EntitySchema::new("Customer").field(EncryptedField::new("ssn")))?;
//! let keys = KeyRing::new();
//! keys.insert("default-key", generate_random_key());
//!
//! let orchestrator = Arc::new(TransformOrchestrator::new(
//!     registry,
//!     Arc::new(keys),
//!     SecureConfig::default(),
//! )?);
//! let mut uow = orchestrator.begin();
//! let report = uow.on_flush(&mut scheduled)?;
//! ```

mod classifier;
mod config;
mod error;
mod ledger;
mod orchestrator;
mod registry;
mod session;

pub use classifier::{FieldClassifier, FieldDescriptor, FieldSet};
pub use config::{LegacyPolicy, SecureConfig};
pub use error::{SecureError, SecureResult};
pub use ledger::TouchLedger;
pub use orchestrator::TransformOrchestrator;
pub use registry::SchemaRegistry;
pub use session::{FlushReport, UnitOfWork};
