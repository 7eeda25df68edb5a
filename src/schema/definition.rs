//! Schema definitions
//!
//! A [`Schema`] is the immutable, shared field table every instance of a
//! type is bound to. Defining one normalizes every declaration and checks
//! alias targets; any problem fails the definition before an instance can
//! exist.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::declaration::FieldDecl;
use super::errors::{SchemaError, SchemaResult};
use super::normalize::normalize;
use super::options::SchemaOptions;
use super::types::{FieldDescriptor, FieldType};

/// Normalized field table plus options
#[derive(Debug)]
pub struct Schema {
    fields: IndexMap<String, Arc<FieldDescriptor>>,
    options: SchemaOptions,
}

impl Schema {
    /// Defines a schema from `(name, declaration)` pairs.
    ///
    /// Field order is preserved and drives serialization order.
    pub fn define<I, K>(fields: I, options: SchemaOptions) -> SchemaResult<Arc<Schema>>
    where
        I: IntoIterator<Item = (K, FieldDecl)>,
        K: Into<String>,
    {
        let mut table: IndexMap<String, Arc<FieldDescriptor>> = IndexMap::new();
        for (name, decl) in fields {
            let name = name.into();
            let descriptor = normalize(decl, &name, &options)?;
            table.insert(name, Arc::new(descriptor));
        }

        for descriptor in table.values() {
            if let FieldType::Alias { target } = &descriptor.field_type {
                match table.get(target) {
                    None => {
                        return Err(SchemaError::unknown_alias_target(&descriptor.name, target))
                    }
                    Some(resolved) if resolved.is_alias() => {
                        return Err(SchemaError::invalid_declaration(
                            &descriptor.name,
                            format!("Alias target '{}' is itself an alias", target),
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        debug!(event = "SCHEMA_DEFINED", fields = table.len(), strict = options.strict);

        Ok(Arc::new(Schema {
            fields: table,
            options,
        }))
    }

    /// Defines a schema from a JSON field table.
    pub fn from_json(fields: &serde_json::Value, options: SchemaOptions) -> SchemaResult<Arc<Schema>> {
        let map = fields.as_object().ok_or_else(|| {
            SchemaError::invalid_declaration("", "A field table must be a JSON object")
        })?;
        let decls = map
            .iter()
            .map(|(name, decl)| Ok((name.clone(), FieldDecl::from_json(decl, name)?)))
            .collect::<SchemaResult<Vec<_>>>()?;
        Schema::define(decls, options)
    }

    pub fn field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.get(name)
    }

    /// Descriptors in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldDescriptor>> {
        self.fields.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field table as a JSON object of descriptor summaries
    pub fn describe(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(name, descriptor)| (name.clone(), descriptor.describe()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::declaration::{FieldSpec, Kind};
    use crate::schema::errors::SchemaErrorCode;
    use serde_json::json;

    #[test]
    fn test_define_preserves_order() {
        let schema = Schema::define(
            [
                ("zeta", Kind::String.into()),
                ("alpha", Kind::Number.into()),
                ("mid", Kind::Boolean.into()),
            ],
            SchemaOptions::default(),
        )
        .unwrap();
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_alias_target_must_exist() {
        let err = Schema::define(
            [("shortcut", FieldSpec::alias("missing").into())],
            SchemaOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::AliasTarget);
    }

    #[test]
    fn test_alias_cannot_chain() {
        let err = Schema::define(
            [
                ("id", FieldDecl::from(Kind::String)),
                ("a", FieldSpec::alias("id").into()),
                ("b", FieldSpec::alias("a").into()),
            ],
            SchemaOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("b"));
    }

    #[test]
    fn test_nested_error_path() {
        let err = Schema::from_json(
            &json!({"profile": {"age": "integer"}}),
            SchemaOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownType);
        assert_eq!(err.field(), Some("profile.age"));
    }

    #[test]
    fn test_from_json() {
        let schema = Schema::from_json(
            &json!({
                "name": {"type": "string", "minLength": 3},
                "tags": ["string"],
                "profile": {"age": "number"}
            }),
            SchemaOptions::default(),
        )
        .unwrap();
        assert_eq!(schema.len(), 3);
        assert!(schema.field("profile").unwrap().object_schema().is_some());
        assert_eq!(schema.describe()["name"]["minLength"], 3);
    }

    #[test]
    fn test_redeclare_from_existing_descriptors() {
        let first = Schema::define(
            [("count", FieldSpec::new(Kind::Number).min(1.0).into())],
            SchemaOptions::default(),
        )
        .unwrap();
        let second = Schema::define(
            first
                .fields()
                .map(|d| (d.name.clone(), FieldDecl::Normalized(Arc::clone(d)))),
            SchemaOptions::default(),
        )
        .unwrap();
        let count = second.field("count").unwrap();
        assert_eq!(count.min.as_ref().map(|c| c.value), Some(1.0));
    }
}
