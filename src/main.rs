//! fieldcast CLI entry point
//!
//! Installs the log subscriber, then delegates to `cli::run`. Logs go to
//! stderr so stdout stays machine-readable; `FIELDCAST_LOG` sets the filter.

use fieldcast::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_env("FIELDCAST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
