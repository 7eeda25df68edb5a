//! Schema Loading Tests
//!
//! Tests for schema documents on disk:
//! - Documents in a directory are registered by name
//! - A registered name cannot be registered again
//! - Declaration defects fail the load loudly
//! - Loaded schemas drive instances like code-defined ones

use std::fs;

use fieldcast::schema::{SchemaErrorCode, SchemaLoader};
use fieldcast::validation::ErrorCode;
use fieldcast::value::Value;
use fieldcast::Instance;
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_doc(dir: &TempDir, file: &str, doc: serde_json::Value) {
    fs::write(dir.path().join(file), doc.to_string()).unwrap();
}

fn users_doc() -> serde_json::Value {
    json!({
        "name": "users",
        "options": { "allowFalsyValues": false },
        "fields": {
            "name": { "type": "string", "required": true, "minLength": [3, "Name too short"] },
            "role": { "type": "string", "enum": ["admin", "member"], "default": "member" },
            "age": { "type": "number", "min": 0 },
            "tags": { "type": "array", "arrayType": "string", "unique": true },
            "address": { "city": "string", "zip": "string" }
        }
    })
}

fn setup_loader() -> (TempDir, SchemaLoader) {
    let tmp = TempDir::new().unwrap();
    write_doc(&tmp, "users.json", users_doc());
    write_doc(&tmp, "notes.json", json!({ "fields": { "body": "string" } }));
    fs::write(tmp.path().join("README.txt"), "not a schema").unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    loader.load_all().unwrap();
    (tmp, loader)
}

// =============================================================================
// Registration Tests
// =============================================================================

/// Every JSON document is registered; other files are ignored.
#[test]
fn test_directory_registers_documents() {
    let (_tmp, loader) = setup_loader();

    assert_eq!(loader.schema_count(), 2);
    assert_eq!(loader.names(), vec!["notes", "users"]);
}

/// Loading the same directory twice is refused.
#[test]
fn test_reload_is_refused() {
    let (_tmp, mut loader) = setup_loader();

    let err = loader.load_all().unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::SchemaRegistered);
}

/// Unknown type tags name the offending field.
#[test]
fn test_unknown_type_fails_load() {
    let tmp = TempDir::new().unwrap();
    write_doc(&tmp, "bad.json", json!({ "fields": { "when": "timestamp" } }));

    let err = SchemaLoader::new(tmp.path()).load_all().unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::UnknownType);
    assert_eq!(err.field(), Some("when"));
}

/// Aliases must point at a declared field.
#[test]
fn test_dangling_alias_fails_load() {
    let tmp = TempDir::new().unwrap();
    write_doc(
        &tmp,
        "bad.json",
        json!({ "fields": { "_id": { "type": "alias", "index": "id" } } }),
    );

    let err = SchemaLoader::new(tmp.path()).load_all().unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::AliasTarget);
}

/// Uncompilable patterns fail at load time, not at write time.
#[test]
fn test_invalid_regex_fails_load() {
    let tmp = TempDir::new().unwrap();
    write_doc(
        &tmp,
        "bad.json",
        json!({ "fields": { "code": { "type": "string", "regex": "([a-z" } } }),
    );

    let err = SchemaLoader::new(tmp.path()).load_all().unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::InvalidPattern);
}

// =============================================================================
// Loaded Schema Behavior Tests
// =============================================================================

/// A loaded schema applies defaults, casts and constraint messages.
#[test]
fn test_loaded_schema_drives_instances() {
    let (_tmp, loader) = setup_loader();
    let users = loader.get("users").unwrap();

    let mut user = Instance::new(&users);
    assert_eq!(user.get("role"), Some(Value::from("member")));

    user.set("name", "Al");
    user.set("age", "41");
    user.set("role", "owner");
    user.array_mut("tags").unwrap().extend(["a", "a", "b"]);
    user.object_mut("address").unwrap().set("zip", 1234);

    let errors = user.get_errors();
    let summary: Vec<(ErrorCode, &str)> = errors.iter().map(|e| (e.code(), e.message())).collect();
    assert_eq!(
        summary,
        vec![
            (ErrorCode::MinLength, "Name too short"),
            (ErrorCode::Enum, "String does not exist in enum list."),
            (ErrorCode::Required, "name is required but not provided"),
        ]
    );
    assert_eq!(
        user.to_json(),
        json!({
            "role": "member",
            "age": 41,
            "tags": ["a", "b"],
            "address": { "zip": "1234" }
        })
    );
}

/// Options in the document reach the schema.
#[test]
fn test_document_options_applied() {
    let (_tmp, loader) = setup_loader();
    let users = loader.get("users").unwrap();
    assert!(!users.options().allow_falsy_values);
    assert!(users.options().strict);

    let mut user = Instance::new(&users);
    user.set("name", "");
    let codes: Vec<ErrorCode> = user.get_errors().iter().map(|e| e.code()).collect();
    assert_eq!(codes, vec![ErrorCode::MinLength, ErrorCode::Required]);
}
