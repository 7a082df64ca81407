//! Processing strategy module for the operations pipeline
//!
//! This module defines the Strategy pattern for complete processing
//! pipelines: reading an operations CSV, driving the engine, and writing one
//! result row per input row. Two implementations are selectable at runtime:
//!
//! - **serial**: awaits each operation in input order. Deterministic output;
//!   a single caller can never trip a user's admission gate.
//! - **concurrent**: spawns one task per operation within each batch. Bursts
//!   against a single user genuinely contend for that user's ten in-flight
//!   slots, so `too_many_requests_*` statuses can appear in the output.

use crate::cli::ExecutionMode;
use crate::core::{BankEngine, EngineConfig};
use crate::types::{Operation, OperationOutcome};
use std::io::Write;
use std::path::Path;

pub mod concurrent;
pub mod serial;

pub use concurrent::{ConcurrentStrategy, DriverConfig};
pub use serial::SerialStrategy;

/// Processing strategy trait for complete operation-processing pipelines.
///
/// Each strategy reads operation rows from a CSV file, runs them through a
/// [`BankEngine`], and writes the result rows to the provided output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from the input file and write result rows.
    ///
    /// Individual operation failures (unknown user, short balance, refused
    /// admission, malformed row) are result rows, not errors; only fatal
    /// pipeline problems (unopenable input, runtime construction, output
    /// I/O) surface here.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the run completed and all result rows were written
    /// * `Err(String)` if a fatal error occurred
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy for the given execution mode.
///
/// # Arguments
///
/// * `mode` - Serial or concurrent execution
/// * `engine_config` - Per-user admission bound for the engine
/// * `driver_config` - Batch/concurrency tuning for the concurrent driver
///   (ignored in serial mode)
pub fn create_strategy(
    mode: ExecutionMode,
    engine_config: EngineConfig,
    driver_config: Option<DriverConfig>,
) -> Box<dyn ProcessingStrategy> {
    match mode {
        ExecutionMode::Serial => Box::new(SerialStrategy::new(engine_config)),
        ExecutionMode::Concurrent => Box::new(ConcurrentStrategy::new(
            engine_config,
            driver_config.unwrap_or_default(),
        )),
    }
}

/// Run one operation against the engine and fold the result into an outcome
/// row. Shared by both drivers.
pub(crate) async fn run_operation(
    engine: &BankEngine,
    seq: u64,
    operation: Operation,
) -> OperationOutcome {
    let result = match &operation {
        Operation::CreateUser { user } => engine.create_user(user).await.map(|_| (None, None)),
        Operation::GetBalance { user, currency } => engine
            .get_balance(user, currency)
            .await
            .map(|balance| (Some(balance), None)),
        Operation::Deposit {
            user,
            amount,
            currency,
        } => engine
            .deposit(user, *amount, currency)
            .await
            .map(|balance| (Some(balance), None)),
        Operation::Withdraw {
            user,
            amount,
            currency,
        } => engine
            .withdraw(user, *amount, currency)
            .await
            .map(|balance| (Some(balance), None)),
        Operation::Send {
            from,
            to,
            amount,
            currency,
        } => engine
            .send(from, to, *amount, currency)
            .await
            .map(|(from_balance, to_balance)| (Some(from_balance), Some(to_balance))),
    };

    match result {
        Ok((balance, to_balance)) => OperationOutcome::success(seq, &operation, balance, to_balance),
        Err(error) => OperationOutcome::failure(seq, &operation, error),
    }
}
