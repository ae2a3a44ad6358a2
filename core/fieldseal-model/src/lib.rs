//! Entity model for fieldseal.
//!
//! Defines the types the encryption core and its host persistence layer
//! agree on:
//! - [`Entity`]: a generic persisted record (id, type, JSON payload)
//! - [`EntitySchema`]: declares which fields of an entity type are
//!   encrypted at rest and under which profile
//! - [`FieldPath`]: a pre-parsed field location, resolved once per type
//! - [`SecureEntity`]: typed read/write access to encrypted fields
//!
//! Hosts with their own record structs implement [`SecureEntity`] directly;
//! hosts that store JSON documents can use [`Entity`] as-is.

mod accessor;
mod entity;
mod error;
mod path;
mod schema;

pub use accessor::{EntityKey, FieldValue, SecureEntity};
pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use path::FieldPath;
pub use schema::{EncryptedField, EntitySchema};
