//! Concurrent processing strategy
//!
//! Reads operations in batches and spawns one tokio task per operation, so
//! operations inside a batch run concurrently. Distinct users never contend;
//! a burst of operations against one user races for that user's ten
//! admission slots exactly as concurrent API callers would, and the refused
//! ones show up as `too_many_requests_*` result rows.
//!
//! Batches are processed sequentially: the driver waits for a whole batch
//! before reading the next, which bounds memory and task fan-out by the
//! batch size. Result rows are sorted back into input order before writing.

use crate::core::{BankEngine, EngineConfig};
use crate::io::async_reader::AsyncOperationReader;
use crate::io::csv_format::{convert_operation_record, rejected_outcome, write_outcomes_csv};
use crate::strategy::{run_operation, ProcessingStrategy};
use crate::types::OperationOutcome;
use std::io::Write;
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;

/// Configuration for the concurrent driver.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Worker threads for the runtime executing the batch
    pub max_concurrent: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl DriverConfig {
    /// Create a DriverConfig with custom values.
    ///
    /// Zero values are invalid and fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                fallback = default.batch_size,
                "invalid batch_size (0), using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            tracing::warn!(
                fallback = default.max_concurrent,
                "invalid max_concurrent (0), using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Concurrent driver: one task per operation within each batch.
#[derive(Debug, Clone)]
pub struct ConcurrentStrategy {
    engine_config: EngineConfig,
    config: DriverConfig,
}

impl ConcurrentStrategy {
    /// Create a concurrent driver with the given engine and driver tuning.
    pub fn new(engine_config: EngineConfig, config: DriverConfig) -> Self {
        Self {
            engine_config,
            config,
        }
    }
}

impl ProcessingStrategy for ConcurrentStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let engine = BankEngine::with_config(self.engine_config.clone());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;
            let mut reader = AsyncOperationReader::new(file.compat());

            let mut outcomes: Vec<OperationOutcome> = Vec::new();

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let mut tasks = Vec::with_capacity(batch.len());
                for sequenced in batch {
                    match convert_operation_record(&sequenced.record) {
                        Ok(operation) => {
                            let engine = engine.clone();
                            tasks.push(tokio::spawn(async move {
                                run_operation(&engine, sequenced.seq, operation).await
                            }));
                        }
                        Err(reason) => {
                            tracing::debug!(seq = sequenced.seq, %reason, "malformed operation row");
                            outcomes.push(rejected_outcome(sequenced.seq, &sequenced.record));
                        }
                    }
                }

                for task in tasks {
                    match task.await {
                        Ok(outcome) => outcomes.push(outcome),
                        Err(e) => tracing::error!(error = %e, "operation task panicked"),
                    }
                }
            }

            outcomes.sort_by_key(|outcome| outcome.seq);
            write_outcomes_csv(&outcomes, output)
        })
    }
}
