//! Schema loader for reading schema documents from disk
//!
//! A schema document is a JSON file:
//!
//! ```json
//! {
//!   "name": "users",
//!   "options": { "strict": true },
//!   "fields": { "name": { "type": "string", "minLength": 3 } }
//! }
//! ```
//!
//! `name` defaults to the file stem and `options` to the defaults.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use super::definition::Schema;
use super::errors::{SchemaError, SchemaResult};
use super::options::SchemaOptions;

#[derive(Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    options: SchemaOptions,
    fields: serde_json::Value,
}

/// Registry of named schemas, optionally backed by a directory of documents.
pub struct SchemaLoader {
    /// Directory containing schema documents
    schema_dir: PathBuf,
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaLoader {
    /// Creates a loader reading `*.json` documents from `schema_dir`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every schema document in the schema directory.
    ///
    /// A missing directory loads nothing. Returns the number of schemas loaded.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        if !self.schema_dir.exists() {
            debug!(
                event = "SCHEMA_DIR_MISSING",
                path = %self.schema_dir.display()
            );
            return Ok(0);
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        // deterministic registration order
        paths.sort();

        for path in &paths {
            let (name, schema) = Self::read_file(path)?;
            self.register(&name, schema)?;
        }

        info!(
            event = "SCHEMAS_LOADED",
            count = paths.len(),
            path = %self.schema_dir.display()
        );
        Ok(paths.len())
    }

    /// Reads and defines a single schema document without registering it.
    pub fn read_file(path: &Path) -> SchemaResult<(String, Arc<Schema>)> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let document: SchemaDocument = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        let name = match document.name {
            Some(name) => name,
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let schema = Schema::from_json(&document.fields, document.options)?;
        Ok((name, schema))
    }

    /// Registers a schema under `name`.
    ///
    /// Registered schemas are immutable; registering a name twice fails.
    pub fn register(&mut self, name: &str, schema: Arc<Schema>) -> SchemaResult<()> {
        if self.schemas.contains_key(name) {
            return Err(SchemaError::schema_registered(name));
        }
        debug!(event = "SCHEMA_REGISTERED", schema = name, fields = schema.len());
        self.schemas.insert(name.to_string(), schema);
        Ok(())
    }

    /// Gets a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Checks if a schema exists.
    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::declaration::Kind;
    use crate::schema::errors::SchemaErrorCode;
    use tempfile::TempDir;

    fn sample_schema() -> Arc<Schema> {
        Schema::define(
            [("name", Kind::String.into()), ("age", Kind::Number.into())],
            SchemaOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register("users", sample_schema()).unwrap();

        let schema = loader.get("users");
        assert!(schema.is_some());
        assert_eq!(schema.unwrap().len(), 2);
    }

    #[test]
    fn test_schema_registered_once() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register("users", sample_schema()).unwrap();

        let result = loader.register("users", sample_schema());
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code(), SchemaErrorCode::SchemaRegistered);
    }

    #[test]
    fn test_load_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("users.json"),
            r#"{"fields": {"name": {"type": "string", "required": true}}}"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("other.json"),
            r#"{"name": "orders", "options": {"strict": false}, "fields": {"total": "number"}}"#,
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        assert_eq!(loader.load_all().unwrap(), 2);
        assert!(loader.exists("users"));
        assert!(loader.exists("orders"));
        assert!(!loader.get("orders").unwrap().options().strict);
        assert_eq!(loader.names(), vec!["orders", "users"]);
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let err = loader.load_all().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MalformedSchema);
    }

    #[test]
    fn test_missing_directory_loads_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(&temp_dir.path().join("absent"));

        assert_eq!(loader.load_all().unwrap(), 0);
        assert_eq!(loader.schema_count(), 0);
    }

    #[test]
    fn test_unknown_schema() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        assert!(loader.get("nonexistent").is_none());
        assert!(!loader.exists("nonexistent"));
    }
}
