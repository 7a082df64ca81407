//! Banking engine CLI
//!
//! Runs banking operations (user creation, deposits, withdrawals, balance
//! queries, transfers) from a CSV file against the in-memory engine and
//! writes one result row per input row to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > results.csv
//! cargo run -- --mode serial operations.csv > results.csv
//! cargo run -- --mode concurrent --batch-size 200 --max-concurrent 8 operations.csv > results.csv
//! ```
//!
//! In concurrent mode, operations within a batch run in parallel; a burst
//! against one user contends for that user's in-flight slots and refused
//! operations are reported as `too_many_requests_*` rows. Serial mode is
//! deterministic.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=banking_engine=debug`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Fatal error (missing arguments, file not found, I/O failure, etc.)

use banking_engine::cli;
use banking_engine::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let strategy = strategy::create_strategy(
        args.mode.clone(),
        args.to_engine_config(),
        args.to_driver_config(),
    );

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
