//! Write-time error records
//!
//! Code ranges:
//! - 11xx: the value could not be typecast
//! - 12xx: the value was cast but failed a constraint
//! - 13xx: the write was refused by a hook

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

use crate::schema::FieldDescriptor;
use crate::value::Value;

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong shape for the field type
    Cast,
    /// Right shape, constraint violated
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Cast => "CastError",
            ErrorKind::Validation => "ValidationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    StringCast,
    NumberParse,
    NumberCast,
    ArrayCast,
    ObjectCast,
    DateCast,
    DateParse,
    Required,
    Enum,
    MinLength,
    MaxLength,
    Regex,
    Min,
    Max,
    WriteRejected,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::StringCast => 1101,
            ErrorCode::NumberParse => 1102,
            ErrorCode::NumberCast => 1103,
            ErrorCode::ArrayCast => 1104,
            ErrorCode::ObjectCast => 1105,
            ErrorCode::DateCast => 1106,
            ErrorCode::DateParse => 1107,
            ErrorCode::Required => 1201,
            ErrorCode::Enum => 1211,
            ErrorCode::MinLength => 1212,
            ErrorCode::MaxLength => 1213,
            ErrorCode::Regex => 1214,
            ErrorCode::Min => 1221,
            ErrorCode::Max => 1222,
            ErrorCode::WriteRejected => 1301,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::StringCast
            | ErrorCode::NumberParse
            | ErrorCode::NumberCast
            | ErrorCode::ArrayCast
            | ErrorCode::ObjectCast
            | ErrorCode::DateCast
            | ErrorCode::DateParse => ErrorKind::Cast,
            _ => ErrorKind::Validation,
        }
    }

    /// Message used when the constraint carries none of its own
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::StringCast => "String type cannot typecast Object or Array types.",
            ErrorCode::NumberParse => "Number could not be typecast from the provided String",
            ErrorCode::NumberCast => "Number type cannot typecast Array or Object types.",
            ErrorCode::ArrayCast => "Array type cannot typecast non-Array types.",
            ErrorCode::ObjectCast => "Object type cannot typecast non-Object types.",
            ErrorCode::DateCast => "Date type cannot typecast Array or Object types.",
            ErrorCode::DateParse => "Could not parse date.",
            ErrorCode::Required => "Value is required but not provided.",
            ErrorCode::Enum => "String does not exist in enum list.",
            ErrorCode::MinLength => "String length too short to meet minLength requirement.",
            ErrorCode::MaxLength => "String length too long to meet maxLength requirement.",
            ErrorCode::Regex => "String does not match regular expression pattern.",
            ErrorCode::Min => "Number is too small to meet min requirement.",
            ErrorCode::Max => "Number is too big to meet max requirement.",
            ErrorCode::WriteRejected => "Write rejected by onBeforeValueSet.",
        }
    }
}

/// One rejected write or unmet requirement.
///
/// Records returned by `Instance::get_errors` belong to the instance they
/// were collected from; `field` is the dotted path below it.
#[derive(Debug, Clone, Error)]
#[error("[{} {}] {field}: {message}", .code.kind(), .code.code())]
pub struct ValidationError {
    code: ErrorCode,
    message: String,
    field: String,
    value: Option<Value>,
    previous: Option<Value>,
    descriptor: Arc<FieldDescriptor>,
}

impl ValidationError {
    pub(crate) fn new(
        code: ErrorCode,
        message: impl Into<String>,
        descriptor: Arc<FieldDescriptor>,
        value: Option<Value>,
        previous: Option<Value>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            field: descriptor.name.clone(),
            value,
            previous,
            descriptor,
        }
    }

    /// Missing required field
    pub(crate) fn required(descriptor: Arc<FieldDescriptor>) -> Self {
        let message = format!("{} is required but not provided", descriptor.name);
        Self::new(ErrorCode::Required, message, descriptor, None, None)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Dotted field path, `parent.child` or `list[2].child` for nested records
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Value that was rejected, after any pre-type transform
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Value the field kept
    pub fn previous(&self) -> Option<&Value> {
        self.previous.as_ref()
    }

    pub fn descriptor(&self) -> &Arc<FieldDescriptor> {
        &self.descriptor
    }

    /// Re-homes the record one level up: `field` becomes `parent.field`.
    pub(crate) fn within(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("ValidationError", 5)?;
        out.serialize_field("type", self.kind().as_str())?;
        out.serialize_field("code", &self.code.code())?;
        out.serialize_field("field", &self.field)?;
        out.serialize_field("message", &self.message)?;
        out.serialize_field("value", &self.value)?;
        out.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn descriptor(name: &str) -> Arc<FieldDescriptor> {
        Arc::new(FieldDescriptor::new(name, FieldType::Number))
    }

    #[test]
    fn test_codes_and_kinds() {
        assert_eq!(ErrorCode::NumberParse.code(), 1102);
        assert_eq!(ErrorCode::NumberParse.kind(), ErrorKind::Cast);
        assert_eq!(ErrorCode::Required.code(), 1201);
        assert_eq!(ErrorCode::Min.kind(), ErrorKind::Validation);
        assert_eq!(ErrorCode::WriteRejected.code(), 1301);
    }

    #[test]
    fn test_required_message() {
        let err = ValidationError::required(descriptor("email"));
        assert_eq!(err.message(), "email is required but not provided");
        assert_eq!(err.field(), "email");
    }

    #[test]
    fn test_within_prefixes_path() {
        let err = ValidationError::required(descriptor("age")).within("profile");
        assert_eq!(err.field(), "profile.age");
        assert_eq!(err.descriptor().name, "age");
    }

    #[test]
    fn test_display() {
        let err = ValidationError::new(
            ErrorCode::Max,
            ErrorCode::Max.default_message(),
            descriptor("count"),
            Some(Value::from(25)),
            Some(Value::from(15)),
        );
        assert_eq!(
            err.to_string(),
            "[ValidationError 1222] count: Number is too big to meet max requirement."
        );
    }

    #[test]
    fn test_serialize() {
        let err = ValidationError::new(
            ErrorCode::NumberParse,
            ErrorCode::NumberParse.default_message(),
            descriptor("count"),
            Some(Value::from("a")),
            None,
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "CastError");
        assert_eq!(json["code"], 1102);
        assert_eq!(json["value"], "a");
    }
}
