//! CLI module for fieldcast
//!
//! Provides command-line interface for:
//! - check: Populate instances from JSON input and report errors
//! - describe: Print the normalized field table of a schema document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, describe, run, run_command, CheckSummary};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_inputs, write_error, write_outcome, write_response};
