use crate::core::EngineConfig;
use crate::strategy::DriverConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Run banking operations from a CSV file
#[derive(Parser, Debug)]
#[command(name = "banking-engine")]
#[command(about = "Run banking operations from a CSV file", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation rows
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Execution mode for running the operations
    #[arg(
        long = "mode",
        value_name = "MODE",
        default_value = "concurrent",
        help = "Execution mode: 'serial' for deterministic in-order runs or 'concurrent' for parallel execution"
    )]
    pub mode: ExecutionMode,

    /// Number of operations per batch (concurrent mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads for the concurrent driver
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Worker threads for concurrent execution (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Per-user bound on in-flight operations
    #[arg(
        long = "max-in-flight",
        value_name = "COUNT",
        help = "Maximum operations in flight per user before requests are refused (default: 10)"
    )]
    pub max_in_flight: Option<usize>,
}

/// Available execution modes for the operations pipeline
#[derive(Clone, Debug, ValueEnum)]
pub enum ExecutionMode {
    Serial,
    Concurrent,
}

impl CliArgs {
    /// Build the engine configuration from CLI arguments.
    ///
    /// Falls back to the default per-user bound when none was given; a zero
    /// value is rejected with a warning inside [`EngineConfig::new`].
    pub fn to_engine_config(&self) -> EngineConfig {
        match self.max_in_flight {
            Some(max_in_flight) => EngineConfig::new(max_in_flight),
            None => EngineConfig::default(),
        }
    }

    /// Build the concurrent-driver configuration from CLI arguments, if any
    /// tuning was given.
    pub fn to_driver_config(&self) -> Option<DriverConfig> {
        if self.batch_size.is_none() && self.max_concurrent.is_none() {
            return None;
        }
        let default = DriverConfig::default();
        Some(DriverConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent.unwrap_or(default.max_concurrent),
        ))
    }
}
