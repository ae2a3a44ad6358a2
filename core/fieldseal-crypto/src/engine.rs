//! The cipher engine: profile-driven sealing of text values.
//!
//! Stateless per call; the only thing it holds is the key provider.

use std::fmt;
use std::sync::Arc;

use crate::cipher::{self, EncryptedData};
use crate::error::{CryptoError, CryptoResult};
use crate::key::KeyProvider;
use crate::profile::EncryptionProfile;

/// Seals and opens field values under an [`EncryptionProfile`].
#[derive(Clone)]
pub struct CipherEngine {
    keys: Arc<dyn KeyProvider>,
}

impl CipherEngine {
    pub fn new(keys: Arc<dyn KeyProvider>) -> Self {
        Self { keys }
    }

    /// Encrypts `plaintext` into an envelope string.
    pub fn encrypt(&self, profile: &EncryptionProfile, plaintext: &str) -> CryptoResult<String> {
        self.seal(profile, plaintext, &[])
    }

    /// Decrypts an envelope produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, profile: &EncryptionProfile, encoded: &str) -> CryptoResult<String> {
        self.open(profile, encoded, &[])
    }

    /// Encrypts `plaintext`, authenticating `aad` alongside it.
    pub fn seal(
        &self,
        profile: &EncryptionProfile,
        plaintext: &str,
        aad: &[u8],
    ) -> CryptoResult<String> {
        let key = self.keys.resolve(profile.key_ref())?;
        let sealed = cipher::encrypt(profile.algorithm(), &key, plaintext.as_bytes(), aad)?;

        let encoded = sealed.encode(profile.encoding());
        let mut envelope = String::with_capacity(profile.marker().len() + encoded.len());
        envelope.push_str(profile.marker());
        envelope.push_str(&encoded);
        Ok(envelope)
    }

    /// Decrypts an envelope sealed with the same `aad`.
    ///
    /// Unmarked input yields [`CryptoError::NotCiphertext`]; an envelope of
    /// another profile yields [`CryptoError::ProfileMismatch`].
    pub fn open(
        &self,
        profile: &EncryptionProfile,
        encoded: &str,
        aad: &[u8],
    ) -> CryptoResult<String> {
        let Some(payload) = encoded.strip_prefix(profile.marker()) else {
            let (found, _) = EncryptionProfile::from_envelope(encoded)?;
            return Err(CryptoError::ProfileMismatch {
                expected: profile.to_string(),
                found: found.to_string(),
            });
        };

        let sealed = EncryptedData::decode(profile.encoding(), payload)?;
        let key = self.keys.resolve(profile.key_ref())?;
        let plaintext = cipher::decrypt(profile.algorithm(), &key, &sealed, aad)?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {}", e)))
    }

    /// True if `value` is a well-formed envelope of `profile`: its marker
    /// followed by a payload that decodes to at least a nonce and a tag.
    ///
    /// Text that merely starts with the marker is not ciphertext. The tag
    /// itself is not checked, so no key is needed.
    pub fn is_ciphertext(&self, profile: &EncryptionProfile, value: &str) -> bool {
        value
            .strip_prefix(profile.marker())
            .is_some_and(|payload| EncryptedData::decode(profile.encoding(), payload).is_ok())
    }

    /// The profile a well-formed envelope was sealed under, if `value` is one.
    pub fn sealed_under(&self, value: &str) -> Option<EncryptionProfile> {
        let (profile, payload) = EncryptionProfile::from_envelope(value).ok()?;
        EncryptedData::decode(profile.encoding(), payload).ok()?;
        Some(profile)
    }
}

impl fmt::Debug for CipherEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEngine").finish_non_exhaustive()
    }
}
