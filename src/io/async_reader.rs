//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over operation records from a CSV file.
//! Supports batch reading so the concurrent driver can spawn one burst of
//! tasks per batch while keeping memory constant.

use crate::io::csv_format::CsvOperationRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// A raw input row paired with its 1-based position in the input.
///
/// The position is what result rows report as `seq`, so output can be
/// matched to input even when operations complete out of order.
#[derive(Debug, Clone)]
pub struct SequencedRecord {
    /// 1-based input position
    pub seq: u64,
    /// The raw row, not yet converted to an operation
    pub record: CsvOperationRecord,
}

/// Asynchronous CSV reader over operation records.
///
/// Maintains streaming behavior with constant memory usage; rows that fail
/// to deserialize at all are logged and skipped (rows that deserialize but
/// describe no valid operation still reach the driver, which reports them as
/// `wrong_arguments`).
pub struct AsyncOperationReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    next_seq: u64,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncOperationReader<R> {
    /// Create a reader from an async byte source.
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            next_seq: 1,
        }
    }

    /// Read up to `batch_size` records.
    ///
    /// Returns an empty vector at end of input.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<SequencedRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvOperationRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => {
                    batch.push(SequencedRecord {
                        seq: self.next_seq,
                        record,
                    });
                    self.next_seq += 1;
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "skipping unreadable CSV row");
                }
                None => break,
            }
        }

        batch
    }
}
