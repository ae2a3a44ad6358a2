use fieldseal_crypto::{Algorithm, CryptoError, Encoding, EncryptionProfile, is_marked};

#[test]
fn parse_two_part_profile_defaults_to_base64() {
    let p: EncryptionProfile = "AES-GCM/default-key".parse().unwrap();
    assert_eq!(p.algorithm(), Algorithm::Aes256Gcm);
    assert_eq!(p.key_ref(), "default-key");
    assert_eq!(p.encoding(), Encoding::Base64);
}

#[test]
fn parse_three_part_profile() {
    let p: EncryptionProfile = "CHACHA20-POLY1305/archive/hex".parse().unwrap();
    assert_eq!(p.algorithm(), Algorithm::ChaCha20Poly1305);
    assert_eq!(p.encoding(), Encoding::Hex);
}

#[test]
fn algorithm_aliases_are_case_insensitive() {
    for id in ["aes-gcm", "AES-256-GCM", "aes256gcm"] {
        assert_eq!(id.parse::<Algorithm>().unwrap(), Algorithm::Aes256Gcm);
    }
}

#[test]
fn display_is_canonical() {
    let p: EncryptionProfile = "aes-256-gcm/k1/B64".parse().unwrap();
    assert_eq!(p.to_string(), "AES-GCM/k1/base64");
}

#[test]
fn unknown_algorithm_rejected() {
    let err = "ROT13/k".parse::<EncryptionProfile>().unwrap_err();
    assert!(err.to_string().contains("unknown algorithm"));
}

#[test]
fn unknown_encoding_rejected() {
    let err = "AES-GCM/k/base32".parse::<EncryptionProfile>().unwrap_err();
    assert!(err.to_string().contains("unknown encoding"));
}

#[test]
fn missing_key_reference_rejected() {
    for raw in ["AES-GCM", "AES-GCM/", ""] {
        let err = raw.parse::<EncryptionProfile>().unwrap_err();
        assert!(
            err.to_string().contains("missing key reference"),
            "{raw:?}: {err}"
        );
    }
}

#[test]
fn key_reference_charset_enforced() {
    assert!("AES-GCM/bad$key".parse::<EncryptionProfile>().is_err());
    assert!("AES-GCM/a b".parse::<EncryptionProfile>().is_err());
    assert!("AES-GCM/tenant_1.v2-key".parse::<EncryptionProfile>().is_ok());
}

#[test]
fn too_many_parts_rejected() {
    assert!("AES-GCM/k/hex/extra".parse::<EncryptionProfile>().is_err());
}

#[test]
fn marks_only_own_envelopes() {
    let a: EncryptionProfile = "AES-GCM/k1".parse().unwrap();
    let b: EncryptionProfile = "AES-GCM/k2".parse().unwrap();
    let value = format!("{}payload", a.marker());
    assert!(a.marks(&value));
    assert!(!b.marks(&value));
    assert!(is_marked(&value));
    assert!(!is_marked("123-45-6789"));
}

#[test]
fn from_envelope_unmarked_is_not_ciphertext() {
    let err = EncryptionProfile::from_envelope("plain text").unwrap_err();
    assert!(matches!(err, CryptoError::NotCiphertext));
}

#[test]
fn from_envelope_bad_algorithm_is_decryption_error() {
    let err = EncryptionProfile::from_envelope("$fs1$ROT13$k$base64$AAAA").unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)));
}

#[test]
fn serde_uses_string_form() {
    let p: EncryptionProfile = "AES-GCM/default-key".parse().unwrap();
    let json = serde_json::to_string(&p).unwrap();
    assert_eq!(json, "\"AES-GCM/default-key/base64\"");
    let back: EncryptionProfile = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p);
    assert!(serde_json::from_str::<EncryptionProfile>("\"nope\"").is_err());
}

#[test]
fn from_envelope_requires_canonical_ids() {
    for header in [
        "$fs1$aes-gcm$k$base64$AAAA",
        "$fs1$AES-256-GCM$k$base64$AAAA",
        "$fs1$AES-GCM$k$b64$AAAA",
        "$fs1$AES-GCM$k$BASE64$AAAA",
    ] {
        let err = EncryptionProfile::from_envelope(header).unwrap_err();
        assert!(matches!(err, CryptoError::Decryption(_)), "{header}");
    }

    let (p, payload) = EncryptionProfile::from_envelope("$fs1$AES-GCM$k$base64$AAAA").unwrap();
    assert_eq!(p.to_string(), "AES-GCM/k/base64");
    assert_eq!(payload, "AAAA");
}

#[test]
fn canonical_ids_roundtrip() {
    for algorithm in [Algorithm::Aes256Gcm, Algorithm::ChaCha20Poly1305] {
        assert_eq!(Algorithm::from_id(algorithm.id()), Some(algorithm));
    }
    for encoding in [Encoding::Base64, Encoding::Hex] {
        assert_eq!(Encoding::from_id(encoding.id()), Some(encoding));
    }
    assert_eq!(Algorithm::from_id("AES-256-GCM"), None);
    assert_eq!(Encoding::from_id("b64"), None);
    // profile strings keep accepting aliases
    assert!("aes-256-gcm/k/b64".parse::<EncryptionProfile>().is_ok());
}
