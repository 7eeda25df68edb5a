//! CLI-specific error types
//!
//! Any CLI error ends the process with exit code 1.

use std::fmt;
use std::io;

use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Schema document missing or malformed
    SchemaError,
    /// I/O error (files, stdin/stdout)
    IoError,
    /// Input that is not a JSON object
    InvalidInput,
    /// At least one input produced validation errors
    ValidationFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaError => "FIELDCAST_CLI_SCHEMA_ERROR",
            Self::IoError => "FIELDCAST_CLI_IO_ERROR",
            Self::InvalidInput => "FIELDCAST_CLI_INVALID_INPUT",
            Self::ValidationFailed => "FIELDCAST_CLI_VALIDATION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn schema_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::SchemaError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    /// `invalid` of `total` inputs failed validation
    pub fn validation_failed(invalid: usize, total: usize) -> Self {
        Self::new(
            CliErrorCode::ValidationFailed,
            format!("{} of {} inputs failed validation", invalid, total),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_input(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::schema_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = CliError::validation_failed(2, 5);
        assert_eq!(
            err.to_string(),
            "FIELDCAST_CLI_VALIDATION_FAILED: 2 of 5 inputs failed validation"
        );
    }

    #[test]
    fn test_schema_error_conversion() {
        let err: CliError = SchemaError::schema_registered("users").into();
        assert_eq!(err.code(), &CliErrorCode::SchemaError);
        assert!(err.message().contains("users"));
    }
}
