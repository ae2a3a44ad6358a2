//! Encryption profiles and the envelope marker they produce.
//!
//! A profile is written `ALGORITHM/key-ref[/encoding]`:
//!
//! ```text
//! AES-GCM/default-key            AES-256-GCM, key "default-key", base64
//! CHACHA20-POLY1305/archive/hex  ChaCha20-Poly1305, key "archive", hex
//! ```
//!
//! Every value sealed under a profile starts with that profile's marker:
//!
//! ```text
//! $fs1$<ALGORITHM>$<key-ref>$<encoding>$<payload>
//! ```
//!
//! where `payload` is the encoding of `nonce || ciphertext || tag`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};

/// Prefix shared by every envelope, whatever its profile.
pub const ENVELOPE_PREFIX: &str = "$fs1$";

const SEPARATOR: char = '$';

/// Supported AEAD algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-256 in Galois/Counter Mode.
    Aes256Gcm,
    /// ChaCha20 stream cipher with Poly1305 authenticator.
    ChaCha20Poly1305,
}

impl Algorithm {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AES-GCM",
            Self::ChaCha20Poly1305 => "CHACHA20-POLY1305",
        }
    }

    /// Exact inverse of [`id`](Self::id). Envelope headers only ever carry
    /// the canonical spelling.
    pub fn from_id(id: &str) -> Option<Self> {
        [Self::Aes256Gcm, Self::ChaCha20Poly1305]
            .into_iter()
            .find(|algorithm| algorithm.id() == id)
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AES-GCM" | "AES-256-GCM" | "AES256GCM" => Ok(Self::Aes256Gcm),
            "CHACHA20-POLY1305" | "CHACHA20POLY1305" => Ok(Self::ChaCha20Poly1305),
            _ => Err(CryptoError::InvalidProfile {
                profile: s.to_string(),
                reason: "unknown algorithm".into(),
            }),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Textual encoding of the sealed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Base64,
    Hex,
}

impl Encoding {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }

    /// Exact inverse of [`id`](Self::id).
    pub fn from_id(id: &str) -> Option<Self> {
        [Self::Base64, Self::Hex]
            .into_iter()
            .find(|encoding| encoding.id() == id)
    }
}

impl FromStr for Encoding {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base64" | "b64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            _ => Err(CryptoError::InvalidProfile {
                profile: s.to_string(),
                reason: "unknown encoding".into(),
            }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// (algorithm, key reference, encoding). Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncryptionProfile {
    algorithm: Algorithm,
    key_ref: String,
    encoding: Encoding,
    marker: String,
}

impl EncryptionProfile {
    pub fn new(algorithm: Algorithm, key_ref: &str, encoding: Encoding) -> CryptoResult<Self> {
        validate_key_ref(key_ref)?;
        let marker = format!(
            "{ENVELOPE_PREFIX}{}{SEPARATOR}{key_ref}{SEPARATOR}{}{SEPARATOR}",
            algorithm.id(),
            encoding.id()
        );
        Ok(Self {
            algorithm,
            key_ref: key_ref.to_string(),
            encoding,
            marker,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_ref(&self) -> &str {
        &self.key_ref
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The envelope prefix every value sealed under this profile carries.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// True if `value` starts with this profile's marker.
    ///
    /// Only the prefix is checked; use
    /// [`CipherEngine::is_ciphertext`](crate::CipherEngine::is_ciphertext)
    /// to also validate the payload.
    pub fn marks(&self, value: &str) -> bool {
        value.starts_with(&self.marker)
    }

    /// Recovers the profile an envelope was sealed under, with its payload.
    ///
    /// Returns [`CryptoError::NotCiphertext`] for values without the
    /// envelope prefix and [`CryptoError::Decryption`] for a prefixed value
    /// whose header is malformed.
    pub fn from_envelope(value: &str) -> CryptoResult<(Self, &str)> {
        let rest = value
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or(CryptoError::NotCiphertext)?;

        let malformed = || CryptoError::Decryption("malformed envelope header".into());
        let mut parts = rest.splitn(4, SEPARATOR);
        let (Some(algorithm), Some(key_ref), Some(encoding), Some(payload)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let (Some(algorithm), Some(encoding)) = (Algorithm::from_id(algorithm), Encoding::from_id(encoding))
        else {
            return Err(malformed());
        };
        let profile = Self::new(algorithm, key_ref, encoding).map_err(|_| malformed())?;

        Ok((profile, payload))
    }
}

/// True if `value` carries the envelope prefix of any profile.
pub fn is_marked(value: &str) -> bool {
    value.starts_with(ENVELOPE_PREFIX)
}

fn validate_key_ref(key_ref: &str) -> CryptoResult<()> {
    let invalid = |reason: &str| CryptoError::InvalidProfile {
        profile: key_ref.to_string(),
        reason: reason.to_string(),
    };
    if key_ref.is_empty() {
        return Err(invalid("missing key reference"));
    }
    if !key_ref
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid("key reference may only contain [A-Za-z0-9._-]"));
    }
    Ok(())
}

impl FromStr for EncryptionProfile {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| CryptoError::InvalidProfile {
            profile: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('/').collect();
        let (algorithm, key_ref, encoding) = match parts.as_slice() {
            [algorithm, key_ref] => (*algorithm, *key_ref, None),
            [algorithm, key_ref, encoding] => (*algorithm, *key_ref, Some(*encoding)),
            [_] => return Err(invalid("missing key reference".into())),
            _ => return Err(invalid("expected ALGORITHM/key-ref[/encoding]".into())),
        };

        let algorithm: Algorithm = algorithm
            .parse()
            .map_err(|_| invalid("unknown algorithm".into()))?;
        let encoding: Encoding = match encoding {
            Some(e) => e.parse().map_err(|_| invalid("unknown encoding".into()))?,
            None => Encoding::default(),
        };
        Self::new(algorithm, key_ref, encoding).map_err(|e| match e {
            CryptoError::InvalidProfile { reason, .. } => invalid(reason),
            other => other,
        })
    }
}

impl fmt::Display for EncryptionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.algorithm, self.key_ref, self.encoding)
    }
}

impl TryFrom<String> for EncryptionProfile {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EncryptionProfile> for String {
    fn from(profile: EncryptionProfile) -> Self {
        profile.to_string()
    }
}
