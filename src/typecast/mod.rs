//! Typecast engine
//!
//! Converts a raw value into the representation a field stores, applying
//! the field's constraints. A cast never touches the target field: it stages
//! a [`Slot`] that the caller commits, or a [`Rejection`] the caller records.
//!
//! Pipeline per write:
//! 1. pre-type `transform` on the raw value
//! 2. explicit null short-circuits when `preserve_null` is set (scalars)
//! 3. type-specific coercion, post-type transform, then constraints

mod container;
mod date;
mod scalar;

use std::sync::Arc;

use crate::instance::Slot;
use crate::schema::{FieldDescriptor, FieldType, HookContext, SchemaOptions};
use crate::validation::ErrorCode;
use crate::value::Value;

pub use date::parse_date;

/// A value the field refused.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub code: ErrorCode,
    pub message: String,
    /// Offending value as it looked when it was refused
    pub value: Option<Value>,
}

impl Rejection {
    pub(crate) fn new(code: ErrorCode, message: Option<&str>, value: Value) -> Self {
        Self {
            code,
            message: message.unwrap_or(code.default_message()).to_string(),
            value: Some(value),
        }
    }
}

/// Typecasts `value` for `descriptor` outside of any instance.
///
/// `Ok(None)` means the field becomes unset. Container fields always
/// produce a container.
pub fn typecast(
    value: Option<Value>,
    current: Option<&Slot>,
    descriptor: &Arc<FieldDescriptor>,
    options: &SchemaOptions,
) -> Result<Option<Slot>, Rejection> {
    cast(value, current, descriptor, options, &HookContext::new(None, &descriptor.name))
}

/// Typecasts against the scope in `ctx`. Staged containers hand that scope
/// down to their elements and nested instances.
pub(crate) fn cast(
    value: Option<Value>,
    current: Option<&Slot>,
    descriptor: &Arc<FieldDescriptor>,
    options: &SchemaOptions,
    ctx: &HookContext<'_>,
) -> Result<Option<Slot>, Rejection> {
    let value = match &descriptor.transform {
        Some(transform) => transform(value, ctx),
        None => value,
    };

    if options.preserve_null && matches!(value, Some(Value::Null)) && !descriptor.is_container() {
        return Ok(Some(Slot::Value(Value::Null)));
    }

    let cast = match &descriptor.field_type {
        FieldType::Array { .. } => {
            return container::cast_array(value, descriptor, options, ctx.scope()).map(Some)
        }
        FieldType::Object { schema } => {
            return container::cast_object(value, current, schema.as_ref(), ctx.scope()).map(Some)
        }
        FieldType::Any | FieldType::Alias { .. } => return Ok(value.map(Slot::Value)),
        FieldType::String => scalar::cast_string(value, descriptor, ctx),
        FieldType::Number => {
            scalar::cast_number(value, descriptor, options.number_group_separator, ctx)
        }
        FieldType::Boolean => scalar::cast_boolean(value, descriptor, ctx),
        FieldType::Date => date::cast_date(value, descriptor, ctx),
    };
    cast.map(|value| value.map(Slot::Value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{normalize, FieldDecl, FieldSpec, Kind};

    fn descriptor(decl: impl Into<FieldDecl>) -> Arc<FieldDescriptor> {
        Arc::new(normalize(decl.into(), "field", &SchemaOptions::default()).unwrap())
    }

    fn stored(result: Result<Option<Slot>, Rejection>) -> Option<Value> {
        match result.unwrap() {
            Some(Slot::Value(value)) => Some(value),
            None => None,
            Some(other) => panic!("expected scalar slot, got {:?}", other),
        }
    }

    #[test]
    fn test_transform_runs_before_type() {
        let number = descriptor(FieldSpec::new(Kind::Number).transform(|value, _| {
            value.map(|v| Value::from(v.to_display_string().replace('$', "")))
        }));
        let result = typecast(Some(Value::from("$12")), None, &number, &SchemaOptions::default());
        assert_eq!(stored(result), Some(Value::from(12)));
    }

    #[test]
    fn test_null_clears_scalars_by_default() {
        let string = descriptor(Kind::String);
        let result = typecast(Some(Value::Null), None, &string, &SchemaOptions::default());
        assert_eq!(stored(result), None);
    }

    #[test]
    fn test_preserve_null_keeps_null() {
        let string = descriptor(Kind::String);
        let options = SchemaOptions {
            preserve_null: true,
            ..SchemaOptions::default()
        };
        let result = typecast(Some(Value::Null), None, &string, &options);
        assert_eq!(stored(result), Some(Value::Null));
    }

    #[test]
    fn test_any_passes_through() {
        let any = descriptor(FieldDecl::Type(crate::schema::TypeDecl::Any));
        let raw = Value::from(vec![Value::from(1), Value::from("a")]);
        let result = typecast(Some(raw.clone()), None, &any, &SchemaOptions::default());
        assert_eq!(stored(result), Some(raw));
    }

    #[test]
    fn test_rejection_carries_code_and_value() {
        let number = descriptor(Kind::Number);
        let rejection = typecast(Some(Value::from("a")), None, &number, &SchemaOptions::default())
            .unwrap_err();
        assert_eq!(rejection.code, ErrorCode::NumberParse);
        assert_eq!(rejection.message, "Number could not be typecast from the provided String");
        assert_eq!(rejection.value, Some(Value::from("a")));
    }
}
