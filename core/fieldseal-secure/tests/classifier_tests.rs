use std::sync::Arc;
use std::thread;

use fieldseal_crypto::{Algorithm, Encoding};
use fieldseal_model::{EncryptedField, Entity, EntitySchema};
use fieldseal_secure::{FieldClassifier, SchemaRegistry, SecureConfig, SecureError};
use pretty_assertions::assert_eq;
use serde_json::json;

fn customer_registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with(
            EntitySchema::new("Customer")
                .field(EncryptedField::new("ssn"))
                .field(EncryptedField::with_profile("/contact/email", "CHACHA20-POLY1305/archive/hex"))
                .field(EncryptedField::new("notes").required()),
        )
        .unwrap()
}

fn classifier(registry: SchemaRegistry) -> FieldClassifier {
    FieldClassifier::new(registry, &SecureConfig::default()).unwrap()
}

#[test]
fn classify_keeps_declaration_order() {
    let fields = classifier(customer_registry()).classify("Customer").unwrap();

    let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["ssn", "email", "notes"]);
}

#[test]
fn undeclared_profile_uses_default() {
    let fields = classifier(customer_registry()).classify("Customer").unwrap();

    let ssn = &fields[0];
    assert_eq!(ssn.profile().algorithm(), Algorithm::Aes256Gcm);
    assert_eq!(ssn.profile().key_ref(), "default-key");
    assert_eq!(ssn.profile().encoding(), Encoding::Base64);

    let email = &fields[1];
    assert_eq!(email.profile().algorithm(), Algorithm::ChaCha20Poly1305);
    assert_eq!(email.profile().key_ref(), "archive");
    assert_eq!(email.profile().encoding(), Encoding::Hex);
}

#[test]
fn nullable_flag_is_carried() {
    let fields = classifier(customer_registry()).classify("Customer").unwrap();
    assert!(fields[0].nullable());
    assert!(!fields[2].nullable());
}

#[test]
fn aad_binds_type_and_field() {
    let fields = classifier(customer_registry()).classify("Customer").unwrap();
    assert_eq!(fields[0].aad(), b"Customer#ssn");
    assert_eq!(fields[1].aad(), b"Customer#/contact/email");
}

#[test]
fn aad_is_empty_without_field_binding() {
    let config = SecureConfig {
        bind_field_context: false,
        ..SecureConfig::default()
    };
    let classifier = FieldClassifier::new(customer_registry(), &config).unwrap();
    let fields = classifier.classify("Customer").unwrap();
    assert!(fields.iter().all(|f| f.aad().is_empty()));
}

#[test]
fn classification_is_cached() {
    let classifier = classifier(customer_registry());
    assert!(classifier.cached_types().is_empty());

    let first = classifier.classify("Customer").unwrap();
    let second = classifier.classify("Customer").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(classifier.cached_types(), vec!["Customer".to_string()]);
}

#[test]
fn unregistered_type_has_no_encrypted_fields() {
    let classifier = classifier(customer_registry());

    assert!(classifier.classify("Invoice").unwrap().is_empty());
    assert!(!classifier.is_secured("Invoice").unwrap());
    assert!(classifier.is_secured("Customer").unwrap());
}

#[test]
fn classify_entity_uses_entity_type() {
    let classifier = classifier(customer_registry());
    let entity = Entity::new("Customer", "c-1", json!({ "ssn": "123-45-6789" }));

    let fields = classifier.classify_entity(&entity).unwrap();
    assert_eq!(fields.len(), 3);
}

#[test]
fn unknown_algorithm_is_a_classification_error() {
    let registry = SchemaRegistry::new()
        .with(EntitySchema::new("Customer").field(EncryptedField::with_profile("ssn", "ROT13/default-key")))
        .unwrap();
    let err = classifier(registry).classify("Customer").unwrap_err();

    assert!(matches!(err, SecureError::Classification { ref entity_type, .. } if entity_type == "Customer"));
    assert!(err.to_string().contains("unknown algorithm"), "{err}");
}

#[test]
fn malformed_profiles_are_rejected() {
    for profile in ["AES-GCM", "AES-GCM/", "AES-GCM/bad key", "AES-GCM/key/base32", "AES-GCM/a/b/c/d"] {
        let registry = SchemaRegistry::new()
            .with(EntitySchema::new("Customer").field(EncryptedField::with_profile("ssn", profile)))
            .unwrap();
        let err = classifier(registry).classify("Customer").unwrap_err();
        assert!(matches!(err, SecureError::Classification { .. }), "{profile}: {err}");
    }
}

#[test]
fn failed_classification_is_not_cached() {
    let registry = SchemaRegistry::new()
        .with(EntitySchema::new("Customer").field(EncryptedField::with_profile("ssn", "ROT13/default-key")))
        .unwrap();
    let classifier = classifier(registry);

    assert!(classifier.classify("Customer").is_err());
    assert!(classifier.classify("Customer").is_err());
    assert!(classifier.cached_types().is_empty());
}

#[test]
fn invalid_field_path_is_rejected() {
    let registry = SchemaRegistry::new()
        .with(EntitySchema::new("Customer").field(EncryptedField::new("/contact//email")))
        .unwrap();
    let err = classifier(registry).classify("Customer").unwrap_err();
    assert!(matches!(err, SecureError::Classification { .. }));
}

#[test]
fn duplicate_field_is_rejected() {
    let registry = SchemaRegistry::new()
        .with(
            EntitySchema::new("Customer")
                .field(EncryptedField::new("ssn"))
                .field(EncryptedField::new("/ssn")),
        )
        .unwrap();
    let err = classifier(registry).classify("Customer").unwrap_err();
    assert!(err.to_string().contains("declared twice"), "{err}");
}

#[test]
fn missing_default_profile_is_rejected() {
    let config = SecureConfig {
        default_profile: None,
        ..SecureConfig::default()
    };
    let classifier = FieldClassifier::new(customer_registry(), &config).unwrap();
    let err = classifier.classify("Customer").unwrap_err();
    assert!(err.to_string().contains("no profile declared"), "{err}");
}

#[test]
fn invalid_default_profile_fails_construction() {
    let config = SecureConfig {
        default_profile: Some("nonsense".into()),
        ..SecureConfig::default()
    };
    let err = FieldClassifier::new(customer_registry(), &config).unwrap_err();
    assert!(matches!(err, SecureError::Config(_)));
}

#[test]
fn concurrent_classification_agrees() {
    let classifier = Arc::new(classifier(customer_registry()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let classifier = Arc::clone(&classifier);
            thread::spawn(move || classifier.classify("Customer").unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let cached = classifier.classify("Customer").unwrap();
    for fields in &results {
        assert_eq!(fields[..], cached[..]);
    }
    assert_eq!(classifier.cached_types().len(), 1);
}
