//! Cipher engine for fieldseal.
//!
//! - [`EncryptionProfile`]: which AEAD, which key, which text encoding
//! - [`CipherEngine`]: seals a text value into an envelope string and back
//! - [`KeyProvider`] / [`KeyRing`]: resolves key references to key material
//!
//! Envelopes are self-describing (`$fs1$<alg>$<key-ref>$<encoding>$...`), so
//! an already-sealed value can be recognised without trying to decrypt it,
//! and a value sealed under an older profile can still be opened after the
//! field's profile changes.

mod cipher;
mod engine;
mod error;
mod key;
mod profile;

pub use cipher::{EncryptedData, NONCE_SIZE, TAG_SIZE, decrypt, encrypt};
pub use engine::CipherEngine;
pub use error::{CryptoError, CryptoResult};
pub use key::{
    DerivedKey, KEY_SIZE, KdfParams, KeyProvider, KeyRing, SALT_SIZE, Salt, derive_key,
    generate_random_key,
};
pub use profile::{Algorithm, ENVELOPE_PREFIX, Encoding, EncryptionProfile, is_marked};
