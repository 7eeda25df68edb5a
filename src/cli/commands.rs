//! CLI command implementations
//!
//! Commands are thin: they load a schema document through the schema
//! loader, drive instances through their public API and print the result.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::instance::Instance;
use crate::schema::{Schema, SchemaLoader};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_inputs, write_error, write_outcome, write_response};

/// Counts reported by `check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub total: usize,
    pub invalid: usize,
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { schema, input } => {
            let summary = check(&schema, input.as_deref())?;
            if summary.invalid > 0 {
                return Err(CliError::validation_failed(summary.invalid, summary.total));
            }
            Ok(())
        }
        Command::Describe { schema } => describe(&schema),
    }
}

fn load_schema(path: &Path) -> CliResult<Arc<Schema>> {
    let (name, schema) = SchemaLoader::read_file(path)?;
    info!(event = "CLI_SCHEMA_LOADED", schema = %name, fields = schema.len());
    Ok(schema)
}

/// Populates one fresh instance per input object and prints each outcome.
///
/// Inputs that are not JSON objects are reported with an error line and
/// counted as invalid.
pub fn check(schema_path: &Path, input: Option<&Path>) -> CliResult<CheckSummary> {
    let schema = load_schema(schema_path)?;
    let inputs = read_inputs(input)?;

    let mut summary = CheckSummary {
        total: inputs.len(),
        invalid: 0,
    };
    for raw in inputs {
        let Value::Object(fields) = raw else {
            let err = CliError::invalid_input("Input must be a JSON object");
            write_error(err.code_str(), err.message())?;
            summary.invalid += 1;
            continue;
        };

        let instance = Instance::with_values(&schema, fields);
        let errors = instance.get_errors();
        if !errors.is_empty() {
            summary.invalid += 1;
        }
        write_outcome(instance.to_json(), &errors)?;
    }

    info!(
        event = "CLI_CHECK_COMPLETE",
        total = summary.total,
        invalid = summary.invalid
    );
    Ok(summary)
}

/// Prints the normalized field table of a schema document
pub fn describe(schema_path: &Path) -> CliResult<()> {
    let schema = load_schema(schema_path)?;
    write_response(schema.describe())
}
