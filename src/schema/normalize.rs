//! Declaration normalization
//!
//! Turns any accepted [`FieldDecl`] shape into a [`FieldDescriptor`].
//! Normalizing a descriptor that is already normalized yields an equivalent
//! descriptor, so field tables can be re-declared from existing schemas.

use std::sync::Arc;

use regex::Regex;
use tracing::trace;

use super::declaration::{FieldDecl, FieldSpec, Kind, TypeDecl};
use super::definition::Schema;
use super::errors::{SchemaError, SchemaResult};
use super::options::SchemaOptions;
use super::types::{FieldDescriptor, FieldType};

/// Normalizes `decl` into a descriptor for the field `name`.
///
/// `options` are the declaring schema's options; inline nested schemas are
/// built from them (see [`SchemaOptions`]).
pub fn normalize(decl: FieldDecl, name: &str, options: &SchemaOptions) -> SchemaResult<FieldDescriptor> {
    let mut spec = match decl {
        FieldDecl::Normalized(descriptor) => {
            let mut descriptor = (*descriptor).clone();
            if !name.is_empty() {
                descriptor.name = name.to_string();
            }
            return Ok(descriptor);
        }
        FieldDecl::Type(ty) => FieldSpec {
            ty,
            ..FieldSpec::default()
        },
        FieldDecl::Spec(spec) => spec,
    };

    loop {
        match std::mem::take(&mut spec.ty) {
            TypeDecl::Spec(inner) => spec = spec.hoist(*inner),
            ty => {
                spec.ty = ty;
                break;
            }
        }
    }

    let field_type = resolve_type(&mut spec, name, options)?;
    let regex = match spec.regex {
        Some(pattern) => {
            let compiled = Regex::new(&pattern.value)
                .map_err(|e| SchemaError::invalid_pattern(name, &e))?;
            Some(pattern.map(|_| compiled))
        }
        None => None,
    };

    trace!(
        event = "FIELD_NORMALIZED",
        field = name,
        field_type = field_type.type_name()
    );

    Ok(FieldDescriptor {
        name: name.to_string(),
        field_type,
        required: spec.required,
        read_only: spec.read_only.unwrap_or(false),
        invisible: spec.invisible.unwrap_or(false),
        default: spec.default,
        getter: spec.getter,
        transform: spec.transform,
        string_transform: spec.string_transform,
        number_transform: spec.number_transform,
        boolean_transform: spec.boolean_transform,
        date_transform: spec.date_transform,
        enum_values: spec.enum_values,
        min_length: spec.min_length,
        max_length: spec.max_length,
        clip: spec.clip.unwrap_or(false),
        regex,
        min: spec.min,
        max: spec.max,
        unique: spec.unique.unwrap_or(false),
        filter: spec.filter,
    })
}

fn resolve_type(spec: &mut FieldSpec, name: &str, options: &SchemaOptions) -> SchemaResult<FieldType> {
    match std::mem::take(&mut spec.ty) {
        TypeDecl::Any => Ok(FieldType::Any),
        TypeDecl::Kind(kind) => match kind {
            Kind::String => Ok(FieldType::String),
            Kind::Number => Ok(FieldType::Number),
            Kind::Boolean => Ok(FieldType::Boolean),
            Kind::Date => Ok(FieldType::Date),
            Kind::Any => Ok(FieldType::Any),
            Kind::Object => Ok(FieldType::Object { schema: None }),
            Kind::Array => array_type(spec.array_type.take().map(|d| *d), name, options),
        },
        TypeDecl::Tag(tag) => match tag.to_ascii_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            "date" => Ok(FieldType::Date),
            "any" => Ok(FieldType::Any),
            "object" => Ok(FieldType::Object { schema: None }),
            "array" => array_type(spec.array_type.take().map(|d| *d), name, options),
            "alias" => match spec.index.take() {
                Some(target) if !target.is_empty() => Ok(FieldType::Alias { target }),
                _ => Err(SchemaError::missing_alias_target(name)),
            },
            _ => Err(SchemaError::unknown_type(name, &tag)),
        },
        TypeDecl::List(mut items) => {
            if items.len() > 1 {
                return Err(SchemaError::invalid_declaration(
                    name,
                    "List literals declare at most one element type",
                ));
            }
            let element = items.pop().or_else(|| spec.array_type.take().map(|d| *d));
            array_type(element, name, options)
        }
        TypeDecl::Fields(fields) if fields.is_empty() => Ok(FieldType::Object { schema: None }),
        TypeDecl::Fields(fields) => {
            let schema = Schema::define(fields, options.for_nested()).map_err(|e| e.within(name))?;
            Ok(FieldType::Object {
                schema: Some(schema),
            })
        }
        TypeDecl::Schema(schema) => Ok(FieldType::Object {
            schema: Some(schema),
        }),
        // hoisted before resolution
        TypeDecl::Spec(_) => Err(SchemaError::invalid_declaration(name, "Unresolved nested spec")),
    }
}

fn array_type(element: Option<FieldDecl>, name: &str, options: &SchemaOptions) -> SchemaResult<FieldType> {
    let element = element
        .map(|decl| normalize(decl, name, options).map(Arc::new))
        .transpose()?;
    Ok(FieldType::Array { element })
}
