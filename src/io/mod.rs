//! I/O handling module
//!
//! CSV parsing and serialization for the operations pipeline:
//! - `csv_format`: record types, conversion to operations, result writing
//! - `async_reader`: batch-reading async CSV reader for the concurrent driver

pub mod async_reader;
pub mod csv_format;

pub use async_reader::{AsyncOperationReader, SequencedRecord};
pub use csv_format::{
    convert_operation_record, rejected_outcome, write_outcomes_csv, CsvOperationRecord,
};
