//! CSV format handling for operation input and result output
//!
//! This module centralizes all CSV format concerns, providing:
//! - `CsvOperationRecord` structure for deserialization
//! - Conversion from CSV records to [`Operation`] values
//! - Result-row serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input format
//!
//! Columns `op,user,to,amount,currency`; operations `create`, `balance`,
//! `deposit`, `withdraw`, `send`. Fields a given operation does not use are
//! left empty. A row that cannot be converted (unknown operation, missing
//! field, unparseable amount) becomes a `wrong_arguments` result row rather
//! than aborting the run - the engine applies the same verdict to malformed
//! input that arrives well-typed.

use crate::types::{Operation, OperationOutcome};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: op, user, to, amount, currency.
/// Everything except the operation name is optional at this layer; which
/// fields are actually required depends on the operation and is enforced in
/// [`convert_operation_record`].
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvOperationRecord {
    /// Operation name (`create`, `balance`, `deposit`, `withdraw`, `send`)
    pub op: String,
    /// Primary user (the sender, for `send`)
    #[serde(default)]
    pub user: String,
    /// Receiving user, for `send`
    #[serde(default)]
    pub to: Option<String>,
    /// Raw amount text, parsed here to keep full decimal precision
    #[serde(default)]
    pub amount: Option<String>,
    /// Currency code, byte-compared downstream
    #[serde(default)]
    pub currency: Option<String>,
}

/// Convert a raw CSV record into an [`Operation`].
///
/// This enforces only the shape of the row: the right fields are present and
/// the amount is a parseable decimal. Semantic validation (non-empty names,
/// strictly positive amounts, `from != to`) belongs to the engine.
///
/// # Returns
///
/// * `Ok(Operation)` - the row describes one of the five operations
/// * `Err(String)` - why the row is malformed
pub fn convert_operation_record(record: &CsvOperationRecord) -> Result<Operation, String> {
    let require = |field: &Option<String>, name: &str| -> Result<String, String> {
        field
            .clone()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| format!("'{}' requires a {}", record.op, name))
    };
    let parse_amount = |raw: &str| -> Result<Decimal, String> {
        Decimal::from_str(raw.trim()).map_err(|_| format!("invalid amount '{}'", raw))
    };

    match record.op.to_lowercase().as_str() {
        "create" => Ok(Operation::CreateUser {
            user: record.user.clone(),
        }),
        "balance" => Ok(Operation::GetBalance {
            user: record.user.clone(),
            currency: require(&record.currency, "currency")?,
        }),
        "deposit" => Ok(Operation::Deposit {
            user: record.user.clone(),
            amount: parse_amount(&require(&record.amount, "amount")?)?,
            currency: require(&record.currency, "currency")?,
        }),
        "withdraw" => Ok(Operation::Withdraw {
            user: record.user.clone(),
            amount: parse_amount(&require(&record.amount, "amount")?)?,
            currency: require(&record.currency, "currency")?,
        }),
        "send" => Ok(Operation::Send {
            from: record.user.clone(),
            to: require(&record.to, "receiver")?,
            amount: parse_amount(&require(&record.amount, "amount")?)?,
            currency: require(&record.currency, "currency")?,
        }),
        other => Err(format!("invalid operation type: '{}'", other)),
    }
}

/// Build the `wrong_arguments` result row for a row that failed conversion.
///
/// The raw fields are echoed back so the caller can match the row to its
/// input.
pub fn rejected_outcome(seq: u64, record: &CsvOperationRecord) -> OperationOutcome {
    OperationOutcome {
        seq,
        op: record.op.clone(),
        user: record.user.clone(),
        to: record.to.clone(),
        currency: record.currency.clone(),
        status: "wrong_arguments".to_string(),
        balance: None,
        to_balance: None,
    }
}

/// Write result rows as CSV.
///
/// Columns: `seq,op,user,to,currency,status,balance,to_balance`. Balances
/// are already in displayed form (two fractional digits); absent fields are
/// empty cells. Rows are written in the order given - callers sort by `seq`
/// first when they processed out of order.
pub fn write_outcomes_csv(
    outcomes: &[OperationOutcome],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "seq", "op", "user", "to", "currency", "status", "balance", "to_balance",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for outcome in outcomes {
        writer
            .write_record(&[
                outcome.seq.to_string(),
                outcome.op.clone(),
                outcome.user.clone(),
                outcome.to.clone().unwrap_or_default(),
                outcome.currency.clone().unwrap_or_default(),
                outcome.status.clone(),
                outcome
                    .balance
                    .map(|b| b.to_string())
                    .unwrap_or_default(),
                outcome
                    .to_balance
                    .map(|b| b.to_string())
                    .unwrap_or_default(),
            ])
            .map_err(|e| format!("Failed to write result record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
