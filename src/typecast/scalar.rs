//! String, number and boolean casts

use crate::schema::{FieldDescriptor, GroupSeparator, HookContext};
use crate::validation::ErrorCode;
use crate::value::{parse_number, Value};

use super::Rejection;

pub(super) fn cast_string(
    value: Option<Value>,
    descriptor: &FieldDescriptor,
    ctx: &HookContext<'_>,
) -> Result<Option<Value>, Rejection> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    if value.is_object_like() {
        return Err(Rejection::new(ErrorCode::StringCast, None, value));
    }

    let mut s = value.to_display_string();
    if let Some(transform) = &descriptor.string_transform {
        s = transform(s, ctx);
    }
    if descriptor.clip {
        if let Some(max) = &descriptor.max_length {
            if s.chars().count() > max.value {
                s = s.chars().take(max.value).collect();
            }
        }
    }

    if let Some(allowed) = &descriptor.enum_values {
        if !allowed.value.iter().any(|candidate| *candidate == s) {
            return Err(Rejection::new(ErrorCode::Enum, allowed.message.as_deref(), Value::String(s)));
        }
    }
    let length = s.chars().count();
    if let Some(min) = &descriptor.min_length {
        if length < min.value {
            return Err(Rejection::new(ErrorCode::MinLength, min.message.as_deref(), Value::String(s)));
        }
    }
    if let Some(max) = &descriptor.max_length {
        if length > max.value {
            return Err(Rejection::new(ErrorCode::MaxLength, max.message.as_deref(), Value::String(s)));
        }
    }
    if let Some(pattern) = &descriptor.regex {
        if !pattern.value.is_match(&s) {
            return Err(Rejection::new(ErrorCode::Regex, pattern.message.as_deref(), Value::String(s)));
        }
    }
    Ok(Some(Value::String(s)))
}

pub(super) fn cast_number(
    value: Option<Value>,
    descriptor: &FieldDescriptor,
    separator: GroupSeparator,
    ctx: &HookContext<'_>,
) -> Result<Option<Value>, Rejection> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(value) => value,
    };

    let mut n = match &value {
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) if n.is_finite() => *n,
        Value::String(s) => match parse_number(&separator.normalize(s)) {
            Some(n) => n,
            None => return Err(Rejection::new(ErrorCode::NumberParse, None, value.clone())),
        },
        Value::Number(_) => return Err(Rejection::new(ErrorCode::NumberParse, None, value.clone())),
        _ => return Err(Rejection::new(ErrorCode::NumberCast, None, value.clone())),
    };

    if let Some(transform) = &descriptor.number_transform {
        n = transform(n, ctx);
    }
    if let Some(min) = &descriptor.min {
        if n < min.value {
            return Err(Rejection::new(ErrorCode::Min, min.message.as_deref(), Value::Number(n)));
        }
    }
    if let Some(max) = &descriptor.max {
        if n > max.value {
            return Err(Rejection::new(ErrorCode::Max, max.message.as_deref(), Value::Number(n)));
        }
    }
    Ok(Some(Value::Number(n)))
}

pub(super) fn cast_boolean(
    value: Option<Value>,
    descriptor: &FieldDescriptor,
    ctx: &HookContext<'_>,
) -> Result<Option<Value>, Rejection> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(value) => value,
    };

    let mut b = match &value {
        Value::String(s) if s == "false" => false,
        other => match other.numeric() {
            Some(n) => n > 0.0,
            None => other.is_truthy(),
        },
    };
    if let Some(transform) = &descriptor.boolean_transform {
        b = transform(b, ctx);
    }
    Ok(Some(Value::Bool(b)))
}
