//! Normalized field descriptors
//!
//! Supported types:
//! - string: UTF-8 string with length, enum and pattern constraints
//! - number: 64-bit float with min/max
//! - boolean
//! - date: UTC timestamp
//! - array: managed list with an optional element descriptor
//! - object: nested instance (with schema) or plain object (without)
//! - alias: reads and writes redirect to another field
//! - any: stored as given

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::json;

use super::definition::Schema;
use super::hooks::{
    BooleanHook, DateHook, DefaultHook, FilterHook, NumberHook, RequiredHook, StringHook,
    ValueHook,
};
use crate::instance::Instance;
use crate::value::Value;

/// Resolved field type
#[derive(Debug, Clone)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    /// Managed array; elements are typecast through `element` when present
    Array {
        element: Option<Arc<FieldDescriptor>>,
    },
    /// Nested instance when `schema` is present, plain object otherwise
    Object {
        schema: Option<Arc<Schema>>,
    },
    /// Redirects to the field named `target`
    Alias {
        target: String,
    },
    Any,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Array { .. } => "array",
            FieldType::Object { .. } => "object",
            FieldType::Alias { .. } => "alias",
            FieldType::Any => "any",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A constraint value with an optional custom rejection message.
#[derive(Debug, Clone)]
pub struct Constraint<T> {
    pub value: T,
    pub message: Option<String>,
}

impl<T> Constraint<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            message: None,
        }
    }

    pub fn with_message(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            message: Some(message.into()),
        }
    }

    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> Constraint<U> {
        Constraint {
            value: f(self.value),
            message: self.message,
        }
    }
}

impl<T> From<T> for Constraint<T> {
    fn from(value: T) -> Self {
        Constraint::new(value)
    }
}

/// Requiredness of a field
#[derive(Debug, Clone)]
pub enum Required {
    Always,
    /// Required only while the predicate holds for the owning instance
    When(RequiredHook),
}

impl Required {
    pub fn applies(&self, instance: &Instance) -> bool {
        match self {
            Required::Always => true,
            Required::When(predicate) => predicate(instance),
        }
    }
}

/// Default applied at construction
#[derive(Debug, Clone)]
pub enum DefaultValue {
    Value(Value),
    Producer(DefaultHook),
}

impl DefaultValue {
    /// Returns a fresh default value
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Producer(producer) => producer(),
        }
    }
}

/// Fully resolved description of one field.
///
/// Descriptors are produced by normalization and shared read-only between
/// every instance of the schema.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub required: Option<Required>,
    pub read_only: bool,
    pub invisible: bool,
    pub default: Option<DefaultValue>,
    pub getter: Option<ValueHook>,
    pub transform: Option<ValueHook>,
    pub string_transform: Option<StringHook>,
    pub number_transform: Option<NumberHook>,
    pub boolean_transform: Option<BooleanHook>,
    pub date_transform: Option<DateHook>,
    pub enum_values: Option<Constraint<Vec<String>>>,
    pub min_length: Option<Constraint<usize>>,
    pub max_length: Option<Constraint<usize>>,
    /// Truncate to `max_length` instead of rejecting
    pub clip: bool,
    pub regex: Option<Constraint<Regex>>,
    pub min: Option<Constraint<f64>>,
    pub max: Option<Constraint<f64>>,
    /// Skip array elements already present
    pub unique: bool,
    pub filter: Option<FilterHook>,
}

impl FieldDescriptor {
    /// Creates an unconstrained descriptor
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: None,
            read_only: false,
            invisible: false,
            default: None,
            getter: None,
            transform: None,
            string_transform: None,
            number_transform: None,
            boolean_transform: None,
            date_transform: None,
            enum_values: None,
            min_length: None,
            max_length: None,
            clip: false,
            regex: None,
            min: None,
            max: None,
            unique: false,
            filter: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.field_type.type_name()
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.field_type, FieldType::Alias { .. })
    }

    /// Arrays and objects hold their container for the instance lifetime
    pub fn is_container(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::Array { .. } | FieldType::Object { .. }
        )
    }

    pub fn element(&self) -> Option<&Arc<FieldDescriptor>> {
        match &self.field_type {
            FieldType::Array { element } => element.as_ref(),
            _ => None,
        }
    }

    pub fn object_schema(&self) -> Option<&Arc<Schema>> {
        match &self.field_type {
            FieldType::Object { schema } => schema.as_ref(),
            _ => None,
        }
    }

    /// Machine-readable summary; callbacks are listed by name only.
    pub fn describe(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        out.insert("type".into(), json!(self.type_name()));
        match &self.field_type {
            FieldType::Alias { target } => {
                out.insert("index".into(), json!(target));
            }
            FieldType::Array {
                element: Some(element),
            } => {
                out.insert("arrayType".into(), element.describe());
            }
            FieldType::Object {
                schema: Some(schema),
            } => {
                out.insert("fields".into(), schema.describe());
            }
            _ => {}
        }
        match &self.required {
            Some(Required::Always) => {
                out.insert("required".into(), json!(true));
            }
            Some(Required::When(_)) => {
                out.insert("required".into(), json!("conditional"));
            }
            None => {}
        }
        if self.read_only {
            out.insert("readOnly".into(), json!(true));
        }
        if self.invisible {
            out.insert("invisible".into(), json!(true));
        }
        if let Some(default) = &self.default {
            let shown = match default {
                DefaultValue::Value(value) => value.to_json(),
                DefaultValue::Producer(_) => json!("<function>"),
            };
            out.insert("default".into(), shown);
        }
        if let Some(values) = &self.enum_values {
            out.insert("enum".into(), json!(values.value));
        }
        if let Some(min_length) = &self.min_length {
            out.insert("minLength".into(), json!(min_length.value));
        }
        if let Some(max_length) = &self.max_length {
            out.insert("maxLength".into(), json!(max_length.value));
        }
        if self.clip {
            out.insert("clip".into(), json!(true));
        }
        if let Some(regex) = &self.regex {
            out.insert("regex".into(), json!(regex.value.as_str()));
        }
        if let Some(min) = &self.min {
            out.insert("min".into(), json!(min.value));
        }
        if let Some(max) = &self.max {
            out.insert("max".into(), json!(max.value));
        }
        if self.unique {
            out.insert("unique".into(), json!(true));
        }
        let hooks: Vec<&str> = [
            ("getter", self.getter.is_some()),
            ("transform", self.transform.is_some()),
            ("stringTransform", self.string_transform.is_some()),
            ("numberTransform", self.number_transform.is_some()),
            ("booleanTransform", self.boolean_transform.is_some()),
            ("dateTransform", self.date_transform.is_some()),
            ("filter", self.filter.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();
        if !hooks.is_empty() {
            out.insert("hooks".into(), json!(hooks));
        }
        serde_json::Value::Object(out)
    }
}
