use fieldseal_model::{Entity, EntityKey, FieldPath, FieldValue, SecureEntity};
use serde_json::json;

fn make_entity(data: serde_json::Value) -> Entity {
    Entity::new("customer", "cust-1", data)
}

fn path(raw: &str) -> FieldPath {
    FieldPath::parse(raw).unwrap()
}

// ── Construction & fields ────────────────────────────────────────

#[test]
fn entity_fields_accessible() {
    let e = make_entity(json!({"ssn": "123-45-6789"}));
    assert_eq!(e.id, "cust-1");
    assert_eq!(e.entity_type, "customer");
    assert_eq!(e.entity_id(), "cust-1");
}

#[test]
fn entity_key_combines_type_and_id() {
    let e = make_entity(json!({}));
    assert_eq!(e.entity_key(), EntityKey::new("customer", "cust-1"));
    assert_eq!(e.entity_key().to_string(), "customer#cust-1");
}

// ── JSON pointer helpers ─────────────────────────────────────────

#[test]
fn get_str_returns_string_field() {
    let e = make_entity(json!({"ssn": "123", "age": 5}));
    assert_eq!(e.get_str("/ssn"), Some("123"));
    assert_eq!(e.get_str("/age"), None);
}

#[test]
fn is_null_covers_missing_and_null() {
    let e = make_entity(json!({"a": null, "b": "x"}));
    assert!(e.is_null("/a"));
    assert!(e.is_null("/missing"));
    assert!(!e.is_null("/b"));
}

// ── SecureEntity ─────────────────────────────────────────────────

#[test]
fn read_field_text() {
    let e = make_entity(json!({"ssn": "123-45-6789"}));
    assert_eq!(e.read_field(&path("/ssn")), FieldValue::Text("123-45-6789"));
}

#[test]
fn read_field_null_and_missing() {
    let e = make_entity(json!({"ssn": null}));
    assert_eq!(e.read_field(&path("/ssn")), FieldValue::Null);
    assert_eq!(e.read_field(&path("/iban")), FieldValue::Null);
}

#[test]
fn read_field_unsupported_types() {
    let e = make_entity(json!({"n": 1, "b": true, "o": {}, "a": []}));
    assert_eq!(e.read_field(&path("/n")), FieldValue::Unsupported("number"));
    assert_eq!(e.read_field(&path("/b")), FieldValue::Unsupported("bool"));
    assert_eq!(e.read_field(&path("/o")), FieldValue::Unsupported("object"));
    assert_eq!(e.read_field(&path("/a")), FieldValue::Unsupported("array"));
}

#[test]
fn read_field_nested() {
    let e = make_entity(json!({"billing": {"iban": "DE89"}}));
    assert_eq!(e.read_field(&path("/billing/iban")), FieldValue::Text("DE89"));
}

#[test]
fn write_field_replaces_value() {
    let mut e = make_entity(json!({"billing": {"iban": "DE89"}}));
    e.write_field(&path("/billing/iban"), "sealed".into()).unwrap();
    assert_eq!(e.get_str("/billing/iban"), Some("sealed"));
}

#[test]
fn write_field_missing_path_fails() {
    let mut e = make_entity(json!({}));
    let err = e.write_field(&path("/billing/iban"), "x".into()).unwrap_err();
    assert!(err.to_string().contains("/billing/iban"));
}

#[test]
fn entity_serde_roundtrip() {
    let e = make_entity(json!({"ssn": "1"}));
    let json = serde_json::to_string(&e).unwrap();
    let back: Entity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, e);
}
