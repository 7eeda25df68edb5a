//! Array and object casts
//!
//! Both stage a fresh container. Committing it into an existing container
//! replaces the contents in place so outside holders of the container keep
//! seeing the field. `root` is the scope of the owning instance; staged
//! elements and nested instances run their callbacks against it.

use std::sync::Arc;

use crate::instance::{Instance, ManagedArray, Slot};
use crate::schema::{FieldDescriptor, Schema, SchemaOptions};
use crate::validation::ErrorCode;
use crate::value::{Map, Value};

use super::Rejection;

/// Null or unset stages an empty array; an object contributes its values.
pub(super) fn cast_array(
    value: Option<Value>,
    descriptor: &Arc<FieldDescriptor>,
    options: &SchemaOptions,
    root: Option<&Instance>,
) -> Result<Slot, Rejection> {
    let items = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) => map.into_values().collect(),
        Some(other) => return Err(Rejection::new(ErrorCode::ArrayCast, None, other)),
    };

    let mut staged = ManagedArray::new(Arc::clone(descriptor), options.clone());
    staged.extend_in(items, root);
    Ok(Slot::Array(staged))
}

/// Plain objects are stored as given. Schema objects are assigned key by
/// key into a staged instance: a bare one when the field already holds an
/// instance (its contents get replaced), one with defaults otherwise.
pub(super) fn cast_object(
    value: Option<Value>,
    current: Option<&Slot>,
    schema: Option<&Arc<Schema>>,
    root: Option<&Instance>,
) -> Result<Slot, Rejection> {
    let map = match value {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => return Err(Rejection::new(ErrorCode::ObjectCast, None, other)),
    };

    let Some(schema) = schema else {
        return Ok(Slot::Value(Value::Object(map)));
    };
    let mut staged = match current {
        Some(Slot::Object(_)) => Instance::bare(schema),
        _ => Instance::new_in(schema, root),
    };
    staged.populate_in(map, root);
    Ok(Slot::Object(staged))
}
