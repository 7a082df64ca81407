//! Serial processing strategy
//!
//! Awaits every operation to completion before starting the next, in input
//! order. With one caller at a time, a user's admission gate always has a
//! free slot, so output is fully deterministic - which makes this the mode
//! for replayable runs and golden-file comparison.

use crate::core::{BankEngine, EngineConfig};
use crate::io::csv_format::{
    convert_operation_record, rejected_outcome, write_outcomes_csv, CsvOperationRecord,
};
use crate::strategy::{run_operation, ProcessingStrategy};
use std::io::Write;
use std::path::Path;

/// Serial, deterministic driver.
#[derive(Debug, Clone)]
pub struct SerialStrategy {
    engine_config: EngineConfig,
}

impl SerialStrategy {
    /// Create a serial driver over an engine with the given configuration.
    pub fn new(engine_config: EngineConfig) -> Self {
        Self { engine_config }
    }
}

impl ProcessingStrategy for SerialStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let engine = BankEngine::with_config(self.engine_config.clone());

            let mut reader = csv::ReaderBuilder::new()
                .flexible(true)
                .trim(csv::Trim::All)
                .from_path(input_path)
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            let mut outcomes = Vec::new();
            let mut seq: u64 = 0;

            for result in reader.deserialize::<CsvOperationRecord>() {
                let record = match result {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unreadable CSV row");
                        continue;
                    }
                };
                seq += 1;

                match convert_operation_record(&record) {
                    Ok(operation) => outcomes.push(run_operation(&engine, seq, operation).await),
                    Err(reason) => {
                        tracing::debug!(seq, %reason, "malformed operation row");
                        outcomes.push(rejected_outcome(seq, &record));
                    }
                }
            }

            write_outcomes_csv(&outcomes, output)
        })
    }
}
