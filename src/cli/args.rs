//! CLI argument definitions using clap
//!
//! Commands:
//! - fieldcast check --schema <path> [--input <path>]
//! - fieldcast describe --schema <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fieldcast - runtime schema enforcement for JSON objects
#[derive(Parser, Debug)]
#[command(name = "fieldcast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Typecast and validate JSON objects against a schema document
    Check {
        /// Path to the schema document
        #[arg(long)]
        schema: PathBuf,

        /// JSON file holding one object or an array of objects.
        /// Reads one object per stdin line when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Print the normalized descriptors of a schema document
    Describe {
        /// Path to the schema document
        #[arg(long)]
        schema: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
