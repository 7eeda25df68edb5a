//! Loose field declarations
//!
//! A field may be declared in several shapes:
//! - a bare type (`Kind::String`, the tag `"string"`, a list literal, an
//!   inline field table or an existing schema)
//! - a [`FieldSpec`] carrying the type plus constraints and hooks
//! - a spec whose type is itself a spec; the inner one is hoisted
//! - an already normalized descriptor, which passes through unchanged
//!
//! JSON declarations follow the same shapes: an object with a `type` key is
//! a spec, any other object is an inline field table.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Map as JsonMap;

use super::definition::Schema;
use super::errors::{SchemaError, SchemaResult};
use super::hooks::{
    BooleanHook, Callback, DateHook, FilterHook, HookContext, NumberHook, StringHook, ValueHook,
};
use super::types::{Constraint, DefaultValue, FieldDescriptor, Required};
use crate::instance::Instance;
use crate::value::Value;

/// Built-in type designators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Number,
    Boolean,
    Date,
    Array,
    Object,
    Any,
}

/// Type position of a declaration
#[derive(Debug, Clone, Default)]
pub enum TypeDecl {
    #[default]
    Any,
    Kind(Kind),
    /// Type name, matched case-insensitively
    Tag(String),
    /// Zero or one element declaration
    List(Vec<FieldDecl>),
    /// Inline nested schema; empty means a plain object
    Fields(IndexMap<String, FieldDecl>),
    Schema(Arc<Schema>),
    /// Spec nested in type position, hoisted during normalization
    Spec(Box<FieldSpec>),
}

impl From<Kind> for TypeDecl {
    fn from(kind: Kind) -> Self {
        TypeDecl::Kind(kind)
    }
}

impl From<&str> for TypeDecl {
    fn from(tag: &str) -> Self {
        TypeDecl::Tag(tag.to_string())
    }
}

impl From<Arc<Schema>> for TypeDecl {
    fn from(schema: Arc<Schema>) -> Self {
        TypeDecl::Schema(schema)
    }
}

impl From<FieldSpec> for TypeDecl {
    fn from(spec: FieldSpec) -> Self {
        TypeDecl::Spec(Box::new(spec))
    }
}

/// A field declaration in any accepted shape
#[derive(Debug, Clone)]
pub enum FieldDecl {
    Type(TypeDecl),
    Spec(FieldSpec),
    Normalized(Arc<FieldDescriptor>),
}

impl FieldDecl {
    /// List literal: `[element]`
    pub fn list(element: impl Into<FieldDecl>) -> Self {
        FieldDecl::Type(TypeDecl::List(vec![element.into()]))
    }

    /// Inline nested schema
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldDecl)>,
        K: Into<String>,
    {
        FieldDecl::Type(TypeDecl::Fields(
            fields.into_iter().map(|(k, d)| (k.into(), d)).collect(),
        ))
    }

    /// Parses a JSON declaration for the field `field`.
    pub fn from_json(value: &serde_json::Value, field: &str) -> SchemaResult<FieldDecl> {
        match value {
            serde_json::Value::Object(map) if map.contains_key("type") => {
                Ok(FieldDecl::Spec(FieldSpec::from_json_map(map, field)?))
            }
            other => Ok(FieldDecl::Type(type_from_json(other, field)?)),
        }
    }
}

impl From<Kind> for FieldDecl {
    fn from(kind: Kind) -> Self {
        FieldDecl::Type(TypeDecl::Kind(kind))
    }
}

impl From<&str> for FieldDecl {
    fn from(tag: &str) -> Self {
        FieldDecl::Type(TypeDecl::Tag(tag.to_string()))
    }
}

impl From<TypeDecl> for FieldDecl {
    fn from(ty: TypeDecl) -> Self {
        FieldDecl::Type(ty)
    }
}

impl From<FieldSpec> for FieldDecl {
    fn from(spec: FieldSpec) -> Self {
        FieldDecl::Spec(spec)
    }
}

impl From<Arc<Schema>> for FieldDecl {
    fn from(schema: Arc<Schema>) -> Self {
        FieldDecl::Type(TypeDecl::Schema(schema))
    }
}

impl From<Arc<FieldDescriptor>> for FieldDecl {
    fn from(descriptor: Arc<FieldDescriptor>) -> Self {
        FieldDecl::Normalized(descriptor)
    }
}

impl From<FieldDescriptor> for FieldDecl {
    fn from(descriptor: FieldDescriptor) -> Self {
        FieldDecl::Normalized(Arc::new(descriptor))
    }
}

/// Explicit declaration: a type plus options.
///
/// Every option is unset by default so that hoisting can tell "not given"
/// apart from "given as false".
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    pub ty: TypeDecl,
    /// Alias target
    pub index: Option<String>,
    pub required: Option<Required>,
    pub read_only: Option<bool>,
    pub invisible: Option<bool>,
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
    pub clip: Option<bool>,
    /// Pattern source, compiled during normalization
    pub regex: Option<Constraint<String>>,
    pub min: Option<Constraint<f64>>,
    pub max: Option<Constraint<f64>>,
    pub array_type: Option<Box<FieldDecl>>,
    pub unique: Option<bool>,
    pub filter: Option<FilterHook>,
}

impl FieldSpec {
    pub fn new(ty: impl Into<TypeDecl>) -> Self {
        Self {
            ty: ty.into(),
            ..Self::default()
        }
    }

    /// Alias field redirecting to `target`
    pub fn alias(target: impl Into<String>) -> Self {
        Self {
            ty: TypeDecl::Tag("alias".into()),
            index: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = Some(Required::Always);
        self
    }

    pub fn required_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Instance) -> bool + Send + Sync + 'static,
    {
        self.required = Some(Required::When(Callback(Arc::new(predicate))));
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = Some(true);
        self
    }

    pub fn invisible(mut self) -> Self {
        self.invisible = Some(true);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Default computed on every construction
    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Producer(Callback(Arc::new(producer))));
        self
    }

    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(Option<Value>, &HookContext<'_>) -> Option<Value> + Send + Sync + 'static,
    {
        self.getter = Some(Callback(Arc::new(getter)));
        self
    }

    /// Runs on the raw value before typecasting
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Option<Value>, &HookContext<'_>) -> Option<Value> + Send + Sync + 'static,
    {
        self.transform = Some(Callback(Arc::new(transform)));
        self
    }

    pub fn string_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(String, &HookContext<'_>) -> String + Send + Sync + 'static,
    {
        self.string_transform = Some(Callback(Arc::new(transform)));
        self
    }

    pub fn number_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(f64, &HookContext<'_>) -> f64 + Send + Sync + 'static,
    {
        self.number_transform = Some(Callback(Arc::new(transform)));
        self
    }

    pub fn boolean_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(bool, &HookContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.boolean_transform = Some(Callback(Arc::new(transform)));
        self
    }

    pub fn date_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(DateTime<Utc>, &HookContext<'_>) -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.date_transform = Some(Callback(Arc::new(transform)));
        self
    }

    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(Constraint::new(values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn one_of_with_message<I, S>(mut self, values: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(Constraint::with_message(
            values.into_iter().map(Into::into).collect(),
            message,
        ));
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(Constraint::new(length));
        self
    }

    pub fn min_length_with_message(mut self, length: usize, message: impl Into<String>) -> Self {
        self.min_length = Some(Constraint::with_message(length, message));
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(Constraint::new(length));
        self
    }

    pub fn max_length_with_message(mut self, length: usize, message: impl Into<String>) -> Self {
        self.max_length = Some(Constraint::with_message(length, message));
        self
    }

    /// Truncate to `max_length` instead of rejecting
    pub fn clip(mut self) -> Self {
        self.clip = Some(true);
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(Constraint::new(pattern.into()));
        self
    }

    pub fn regex_with_message(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.regex = Some(Constraint::with_message(pattern.into(), message));
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(Constraint::new(min));
        self
    }

    pub fn min_with_message(mut self, min: f64, message: impl Into<String>) -> Self {
        self.min = Some(Constraint::with_message(min, message));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(Constraint::new(max));
        self
    }

    pub fn max_with_message(mut self, max: f64, message: impl Into<String>) -> Self {
        self.max = Some(Constraint::with_message(max, message));
        self
    }

    pub fn array_of(mut self, element: impl Into<FieldDecl>) -> Self {
        self.array_type = Some(Box::new(element.into()));
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Callback(Arc::new(filter)));
        self
    }

    /// Merges an inner spec found in type position.
    ///
    /// Options set on `self` win; the inner type replaces the type position.
    pub(crate) fn hoist(self, inner: FieldSpec) -> FieldSpec {
        FieldSpec {
            ty: inner.ty,
            index: self.index.or(inner.index),
            required: self.required.or(inner.required),
            read_only: self.read_only.or(inner.read_only),
            invisible: self.invisible.or(inner.invisible),
            default: self.default.or(inner.default),
            getter: self.getter.or(inner.getter),
            transform: self.transform.or(inner.transform),
            string_transform: self.string_transform.or(inner.string_transform),
            number_transform: self.number_transform.or(inner.number_transform),
            boolean_transform: self.boolean_transform.or(inner.boolean_transform),
            date_transform: self.date_transform.or(inner.date_transform),
            enum_values: self.enum_values.or(inner.enum_values),
            min_length: self.min_length.or(inner.min_length),
            max_length: self.max_length.or(inner.max_length),
            clip: self.clip.or(inner.clip),
            regex: self.regex.or(inner.regex),
            min: self.min.or(inner.min),
            max: self.max.or(inner.max),
            array_type: self.array_type.or(inner.array_type),
            unique: self.unique.or(inner.unique),
            filter: self.filter.or(inner.filter),
        }
    }

    fn from_json_map(map: &JsonMap<String, serde_json::Value>, field: &str) -> SchemaResult<FieldSpec> {
        let mut spec = FieldSpec::default();
        for (key, value) in map {
            match key.as_str() {
                "type" => spec.ty = type_from_json(value, field)?,
                "index" => spec.index = Some(json_string(value, field, key)?),
                "required" => {
                    if json_bool(value, field, key)? {
                        spec.required = Some(Required::Always);
                    }
                }
                "readOnly" => spec.read_only = Some(json_bool(value, field, key)?),
                "invisible" => spec.invisible = Some(json_bool(value, field, key)?),
                "clip" => spec.clip = Some(json_bool(value, field, key)?),
                "unique" => spec.unique = Some(json_bool(value, field, key)?),
                "default" => spec.default = Some(DefaultValue::Value(Value::from(value))),
                "enum" => spec.enum_values = Some(enum_constraint(value, field)?),
                "minLength" => spec.min_length = Some(constraint(value, field, key, json_usize)?),
                "maxLength" => spec.max_length = Some(constraint(value, field, key, json_usize)?),
                "min" => spec.min = Some(constraint(value, field, key, |v| v.as_f64())?),
                "max" => spec.max = Some(constraint(value, field, key, |v| v.as_f64())?),
                "regex" => {
                    spec.regex = Some(constraint(value, field, key, |v| {
                        v.as_str().map(str::to_string)
                    })?)
                }
                "arrayType" => spec.array_type = Some(Box::new(FieldDecl::from_json(value, field)?)),
                other => {
                    return Err(SchemaError::invalid_declaration(
                        field,
                        format!("Unknown declaration key '{}'", other),
                    ))
                }
            }
        }
        Ok(spec)
    }
}

fn type_from_json(value: &serde_json::Value, field: &str) -> SchemaResult<TypeDecl> {
    match value {
        serde_json::Value::Null => Ok(TypeDecl::Any),
        serde_json::Value::String(tag) => Ok(TypeDecl::Tag(tag.clone())),
        serde_json::Value::Array(items) => Ok(TypeDecl::List(
            items
                .iter()
                .map(|item| FieldDecl::from_json(item, field))
                .collect::<SchemaResult<Vec<_>>>()?,
        )),
        serde_json::Value::Object(map) if map.contains_key("type") => {
            Ok(TypeDecl::Spec(Box::new(FieldSpec::from_json_map(map, field)?)))
        }
        serde_json::Value::Object(map) => {
            let mut fields = IndexMap::new();
            for (name, decl) in map {
                let parsed = FieldDecl::from_json(decl, name).map_err(|e| e.within(field))?;
                fields.insert(name.clone(), parsed);
            }
            Ok(TypeDecl::Fields(fields))
        }
        other => Err(SchemaError::invalid_declaration(
            field,
            format!("A {} cannot declare a type", Value::from(other).type_name()),
        )),
    }
}

fn json_bool(value: &serde_json::Value, field: &str, key: &str) -> SchemaResult<bool> {
    value.as_bool().ok_or_else(|| {
        SchemaError::invalid_declaration(field, format!("'{}' must be a boolean", key))
    })
}

fn json_string(value: &serde_json::Value, field: &str, key: &str) -> SchemaResult<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        SchemaError::invalid_declaration(field, format!("'{}' must be a string", key))
    })
}

fn json_usize(value: &serde_json::Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

/// Reads `value`, `[value, message]` or `{"value": .., "errorMessage": ..}`.
fn constraint<T>(
    value: &serde_json::Value,
    field: &str,
    key: &str,
    parse: impl Fn(&serde_json::Value) -> Option<T>,
) -> SchemaResult<Constraint<T>> {
    let invalid =
        || SchemaError::invalid_declaration(field, format!("'{}' has an invalid value", key));
    match value {
        serde_json::Value::Array(pair) if pair.len() == 2 => {
            let message = pair[1].as_str().ok_or_else(invalid)?;
            let inner = parse(&pair[0]).ok_or_else(invalid)?;
            Ok(Constraint::with_message(inner, message))
        }
        serde_json::Value::Object(map) => {
            let inner = map.get("value").and_then(&parse).ok_or_else(invalid)?;
            Ok(Constraint {
                value: inner,
                message: map
                    .get("errorMessage")
                    .and_then(|m| m.as_str())
                    .map(str::to_string),
            })
        }
        other => parse(other).map(Constraint::new).ok_or_else(invalid),
    }
}

/// Reads a list, `[list, message]` or `{"value": list, "errorMessage": ..}`.
///
/// A two-item array is the message form only when the first item is itself
/// a list and the second a string.
fn enum_constraint(value: &serde_json::Value, field: &str) -> SchemaResult<Constraint<Vec<String>>> {
    let strings = |v: &serde_json::Value| -> Option<Vec<String>> {
        v.as_array()?
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
                scalar => Some(Value::from(scalar).to_display_string()),
            })
            .collect()
    };
    let parsed = match value {
        serde_json::Value::Array(pair) => match pair.as_slice() {
            [list @ serde_json::Value::Array(_), serde_json::Value::String(message)] => {
                strings(list).map(|values| Constraint::with_message(values, message.as_str()))
            }
            _ => strings(value).map(Constraint::new),
        },
        serde_json::Value::Object(map) => map.get("value").and_then(strings).map(|values| Constraint {
            value: values,
            message: map
                .get("errorMessage")
                .and_then(|m| m.as_str())
                .map(str::to_string),
        }),
        _ => None,
    };
    parsed.ok_or_else(|| SchemaError::invalid_declaration(field, "'enum' must be a list of strings"))
}
