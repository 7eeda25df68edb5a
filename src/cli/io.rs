//! JSON I/O handling for CLI
//!
//! - Input: a JSON file (one object or an array of objects), or one JSON
//!   object per stdin line
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};
use crate::validation::ValidationError;

/// Reads the input objects from `path`, or from stdin when `None`.
///
/// Blank stdin lines are skipped.
pub fn read_inputs(path: Option<&Path>) -> CliResult<Vec<Value>> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let parsed: Value = serde_json::from_str(&content)?;
            match parsed {
                Value::Array(items) => Ok(items),
                single => Ok(vec![single]),
            }
        }
        None => {
            let stdin = io::stdin();
            let mut inputs = Vec::new();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                inputs.push(serde_json::from_str(&line)?);
            }
            Ok(inputs)
        }
    }
}

fn emit(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    emit(&json!({
        "status": "ok",
        "data": data
    }))
}

/// Write the outcome of one checked input to stdout
pub fn write_outcome(data: Value, errors: &[ValidationError]) -> CliResult<()> {
    let status = if errors.is_empty() { "ok" } else { "invalid" };
    emit(&json!({
        "status": status,
        "data": data,
        "errors": serde_json::to_value(errors)?
    }))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    emit(&json!({
        "status": "error",
        "code": code,
        "message": message
    }))
}
