//! Authenticated encryption of single values.
//!
//! Both supported algorithms are AEADs with a 96-bit nonce and a 128-bit
//! tag, so the sealed layout is the same for either:
//!
//! ```text
//! [ nonce (12 bytes) ][ ciphertext ][ tag (16 bytes) ]
//! ```

use aes_gcm::Aes256Gcm;
use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20poly1305::ChaCha20Poly1305;
use chacha20poly1305::aead::{self, Aead, KeyInit, Payload};
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::key::{DerivedKey, KEY_SIZE};
use crate::profile::{Algorithm, Encoding};

/// Size of nonce in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypted data with the nonce needed for decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    /// The nonce used for encryption (unique per encryption).
    pub nonce: [u8; NONCE_SIZE],
    /// The encrypted ciphertext (includes auth tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Returns the total size of the sealed bytes.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Concatenates nonce and ciphertext.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Splits sealed bytes back into nonce and ciphertext.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption("data too short".to_string()));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_SIZE..].to_vec(),
        })
    }

    /// Encodes the sealed bytes as text.
    pub fn encode(&self, encoding: Encoding) -> String {
        let bytes = self.to_bytes();
        match encoding {
            Encoding::Base64 => STANDARD.encode(&bytes),
            Encoding::Hex => hex::encode(&bytes),
        }
    }

    /// Decodes sealed bytes from text.
    ///
    /// Only the canonical form [`encode`](Self::encode) produces is accepted,
    /// so two different strings never decode to the same bytes.
    pub fn decode(encoding: Encoding, encoded: &str) -> CryptoResult<Self> {
        let bytes = match encoding {
            Encoding::Base64 => STANDARD
                .decode(encoded)
                .map_err(|e| CryptoError::Decryption(format!("invalid base64: {}", e)))?,
            Encoding::Hex => {
                if encoded.bytes().any(|b| b.is_ascii_uppercase()) {
                    return Err(CryptoError::Decryption("invalid hex: uppercase digit".into()));
                }
                hex::decode(encoded)
                    .map_err(|e| CryptoError::Decryption(format!("invalid hex: {}", e)))?
            }
        };
        Self::from_bytes(&bytes)
    }
}

/// Encrypts plaintext with a fresh random nonce.
///
/// `aad` is authenticated but not encrypted; the same bytes must be passed
/// to [`decrypt`].
pub fn encrypt(
    algorithm: Algorithm,
    key: &DerivedKey,
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<EncryptedData> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = match algorithm {
        Algorithm::Aes256Gcm => seal_with::<Aes256Gcm>(key, &nonce, plaintext, aad)?,
        Algorithm::ChaCha20Poly1305 => seal_with::<ChaCha20Poly1305>(key, &nonce, plaintext, aad)?,
    };

    Ok(EncryptedData { nonce, ciphertext })
}

/// Decrypts and authenticates sealed data.
///
/// Fails with [`CryptoError::Decryption`] on a wrong key, wrong `aad` or
/// any tampering; no partial plaintext is ever returned.
pub fn decrypt(
    algorithm: Algorithm,
    key: &DerivedKey,
    encrypted: &EncryptedData,
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    match algorithm {
        Algorithm::Aes256Gcm => open_with::<Aes256Gcm>(key, encrypted, aad),
        Algorithm::ChaCha20Poly1305 => open_with::<ChaCha20Poly1305>(key, encrypted, aad),
    }
}

fn init<C: KeyInit>(key: &DerivedKey) -> CryptoResult<C> {
    C::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: key.as_bytes().len(),
    })
}

fn seal_with<C: Aead + KeyInit>(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    msg: &[u8],
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    init::<C>(key)?
        .encrypt(aead::Nonce::<C>::from_slice(&nonce[..]), Payload { msg, aad })
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

fn open_with<C: Aead + KeyInit>(
    key: &DerivedKey,
    encrypted: &EncryptedData,
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    let payload = Payload {
        msg: &encrypted.ciphertext,
        aad,
    };
    init::<C>(key)?
        .decrypt(aead::Nonce::<C>::from_slice(&encrypted.nonce[..]), payload)
        .map_err(|_| {
            CryptoError::Decryption("decryption failed (wrong key or tampered data)".to_string())
        })
}
