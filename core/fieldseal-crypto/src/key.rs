//! Key material and key resolution.
//!
//! Profiles name their key by reference (`"default-key"`); a [`KeyProvider`]
//! turns that reference into a [`DerivedKey`] at encryption time. Keys are
//! either supplied raw (from a KMS or secrets file) or derived from a
//! passphrase with Argon2id.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use argon2::{Argon2, Params, Version};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Size of encryption keys in bytes (256 bits for both AEADs).
pub const KEY_SIZE: usize = 32;

/// Length of a passphrase salt.
pub const SALT_SIZE: usize = 16;

/// Key material for one key reference.
///
/// Handed out by a [`KeyProvider`] for a single seal or open and wiped
/// when dropped. `Debug` never prints the bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Wraps key bytes loaded from elsewhere (a KMS response, a secrets
    /// file). Anything but [`KEY_SIZE`] bytes is rejected.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Salt for [`KeyRing::insert_passphrase`].
///
/// Must be stored next to the key reference: the same passphrase with a
/// different salt yields a different key, and every value sealed under the
/// old one becomes unreadable.
#[derive(Clone, Debug)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    pub fn random() -> Self {
        let mut salt = Self::from_bytes([0u8; SALT_SIZE]);
        rand::rngs::OsRng.fill_bytes(&mut salt.bytes);
        salt
    }

    /// Restores a previously stored salt.
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.bytes
    }
}

/// Cost settings for passphrase-derived keys.
///
/// Changing them changes the derived key, so they belong with the salt in
/// whatever configuration names the key reference.
#[derive(Clone, Debug)]
pub struct KdfParams {
    /// KiB of memory per derivation.
    pub memory_cost: u32,
    /// Passes over that memory.
    pub time_cost: u32,
    /// Lanes.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // Argon2id minimums for interactive use: 19 MiB, 2 passes, 1 lane.
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    fn hasher(&self) -> CryptoResult<Argon2<'static>> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, Some(KEY_SIZE))
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Stretches a passphrase into a [`KEY_SIZE`]-byte key (Argon2id).
///
/// Deterministic for a given passphrase, salt and params, which is what
/// lets a restarted process resolve the same key reference again.
pub fn derive_key(passphrase: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<DerivedKey> {
    let mut key = DerivedKey::from_bytes([0u8; KEY_SIZE]);
    params
        .hasher()?
        .hash_password_into(passphrase.as_bytes(), salt.as_bytes(), &mut key.bytes)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// A fresh key from the OS RNG, for hosts that keep raw keys.
pub fn generate_random_key() -> DerivedKey {
    let mut key = DerivedKey::from_bytes([0u8; KEY_SIZE]);
    rand::rngs::OsRng.fill_bytes(&mut key.bytes);
    key
}

/// Resolves key references to key material.
///
/// Implementations own the key material; the cipher engine asks for a key
/// per operation and drops it right after. Failures are reported as
/// [`CryptoError::KeyResolution`] and are never retried by the engine.
pub trait KeyProvider: Send + Sync {
    /// Returns the key registered under `key_ref`.
    fn resolve(&self, key_ref: &str) -> CryptoResult<DerivedKey>;
}

/// Thread-safe in-memory key ring.
#[derive(Clone, Default)]
pub struct KeyRing {
    keys: Arc<RwLock<HashMap<String, DerivedKey>>>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the key for a reference.
    pub fn insert(&self, key_ref: impl Into<String>, key: DerivedKey) {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key_ref.into(), key);
    }

    /// Derives a key from a passphrase and registers it.
    pub fn insert_passphrase(
        &self,
        key_ref: impl Into<String>,
        passphrase: &str,
        salt: &Salt,
        params: &KdfParams,
    ) -> CryptoResult<()> {
        let key = derive_key(passphrase, salt, params)?;
        self.insert(key_ref, key);
        Ok(())
    }

    /// Removes a key (e.g. after rotation has re-sealed every value).
    pub fn remove(&self, key_ref: &str) -> Option<DerivedKey> {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key_ref)
    }

    pub fn contains(&self, key_ref: &str) -> bool {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key_ref)
    }

    /// Returns the number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyProvider for KeyRing {
    fn resolve(&self, key_ref: &str) -> CryptoResult<DerivedKey> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key_ref)
            .cloned()
            .ok_or_else(|| CryptoError::KeyResolution(format!("no key registered for {key_ref:?}")))
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing").field("keys", &self.len()).finish()
    }
}
