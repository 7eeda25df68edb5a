//! Schema definition errors
//!
//! These are raised while a schema is being declared or loaded, never while
//! an instance is being written. Write-time problems are recorded as
//! [`crate::validation::ValidationError`] records instead.
//!
//! Error codes:
//! - FIELDCAST_UNKNOWN_TYPE
//! - FIELDCAST_ALIAS_TARGET
//! - FIELDCAST_INVALID_PATTERN
//! - FIELDCAST_INVALID_DECLARATION
//! - FIELDCAST_SCHEMA_REGISTERED
//! - FIELDCAST_MALFORMED_SCHEMA

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Type tag not recognised
    UnknownType,
    /// Alias without a target, or pointing at an undeclared field
    AliasTarget,
    /// Regular expression failed to compile
    InvalidPattern,
    /// Declaration shape not understood
    InvalidDeclaration,
    /// Schema name registered twice
    SchemaRegistered,
    /// Schema file unreadable or not valid JSON
    MalformedSchema,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownType => "FIELDCAST_UNKNOWN_TYPE",
            SchemaErrorCode::AliasTarget => "FIELDCAST_ALIAS_TARGET",
            SchemaErrorCode::InvalidPattern => "FIELDCAST_INVALID_PATTERN",
            SchemaErrorCode::InvalidDeclaration => "FIELDCAST_INVALID_DECLARATION",
            SchemaErrorCode::SchemaRegistered => "FIELDCAST_SCHEMA_REGISTERED",
            SchemaErrorCode::MalformedSchema => "FIELDCAST_MALFORMED_SCHEMA",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with the offending field, when there is one
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    field: Option<String>,
}

impl SchemaError {
    fn for_field(code: SchemaErrorCode, field: &str, message: String) -> Self {
        Self {
            code,
            message,
            field: Some(field.to_string()),
        }
    }

    pub fn unknown_type(field: &str, tag: &str) -> Self {
        Self::for_field(
            SchemaErrorCode::UnknownType,
            field,
            format!("Unknown type '{}'", tag),
        )
    }

    pub fn missing_alias_target(field: &str) -> Self {
        Self::for_field(
            SchemaErrorCode::AliasTarget,
            field,
            "Alias fields must name a target with 'index'".into(),
        )
    }

    pub fn unknown_alias_target(field: &str, target: &str) -> Self {
        Self::for_field(
            SchemaErrorCode::AliasTarget,
            field,
            format!("Alias target '{}' is not declared", target),
        )
    }

    pub fn invalid_pattern(field: &str, source: &regex::Error) -> Self {
        Self::for_field(
            SchemaErrorCode::InvalidPattern,
            field,
            format!("Invalid regex: {}", source),
        )
    }

    pub fn invalid_declaration(field: &str, reason: impl Into<String>) -> Self {
        Self::for_field(SchemaErrorCode::InvalidDeclaration, field, reason.into())
    }

    /// Create a duplicate registration error
    pub fn schema_registered(name: &str) -> Self {
        Self {
            code: SchemaErrorCode::SchemaRegistered,
            message: format!("Schema '{}' is already registered", name),
            field: None,
        }
    }

    /// Create an error for a malformed schema file
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::MalformedSchema,
            message: format!("Malformed schema file '{}': {}", path.into(), reason.into()),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field being declared, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Prefixes the field path with an enclosing field name.
    pub(crate) fn within(mut self, parent: &str) -> Self {
        self.field = Some(match self.field.take() {
            Some(field) if !field.is_empty() => format!("{}.{}", parent, field),
            _ => parent.to_string(),
        });
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code.code())?;
        if let Some(field) = &self.field {
            write!(f, " (field '{}')", field)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::UnknownType.code(), "FIELDCAST_UNKNOWN_TYPE");
        assert_eq!(SchemaErrorCode::AliasTarget.code(), "FIELDCAST_ALIAS_TARGET");
        assert_eq!(SchemaErrorCode::SchemaRegistered.code(), "FIELDCAST_SCHEMA_REGISTERED");
    }

    #[test]
    fn test_display_names_field() {
        let err = SchemaError::unknown_type("age", "integer");
        let display = format!("{}", err);
        assert!(display.contains("FIELDCAST_UNKNOWN_TYPE"));
        assert!(display.contains("age"));
        assert!(display.contains("integer"));
    }

    #[test]
    fn test_within_builds_dotted_path() {
        let err = SchemaError::unknown_type("city", "place").within("address");
        assert_eq!(err.field(), Some("address.city"));
    }
}
