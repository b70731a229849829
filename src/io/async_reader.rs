//! Asynchronous CSV reader with batch interface
//!
//! Provides batch reading of replay commands for the concurrent strategy.
//! Delegates parsing and conversion to the `csv_format` module; invalid
//! rows are warn-logged and skipped so a malformed row never stalls the
//! replay.

use crate::io::csv_format::{convert_event_row, EventRow, ReplayCommand};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV event reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of replay commands
    ///
    /// Reads up to `batch_size` rows, converting them to commands. Invalid
    /// rows are logged and skipped. An empty vector means end of file.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<ReplayCommand> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<EventRow>();

        while batch.len() < batch_size {
            match rows.next().await {
                Some(Ok(event_row)) => match convert_event_row(event_row) {
                    Ok(command) => batch.push(command),
                    Err(e) => tracing::warn!(error = %e, "row conversion error, skipping"),
                },
                Some(Err(e)) => tracing::warn!(error = %e, "CSV parse error, skipping"),
                None => break,
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, OrderEvent};
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    const HEADER: &str = "event,order,actor,peer,conversation,amount,detail\n";

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let content = format!(
            "{}fund,,10,,,100.0,\nopen,1,10,20,700,100.0,\naccept,1,20,,,,\n",
            HEADER
        );
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let batch = reader.read_batch(10).await;

        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch[0],
            ReplayCommand::Fund {
                party: 10,
                amount: Decimal::new(1000, 1)
            }
        );
        assert_eq!(
            batch[2],
            ReplayCommand::Apply {
                order: 1,
                actor: Actor::Party(20),
                event: OrderEvent::Accept
            }
        );
    }

    #[tokio::test]
    async fn test_async_reader_respects_batch_size() {
        let mut content = String::from(HEADER);
        for party in 1..=5 {
            content.push_str(&format!("fund,,{},,,10.0,\n", party));
        }
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let first = reader.read_batch(2).await;
        let second = reader.read_batch(2).await;
        let third = reader.read_batch(2).await;
        let fourth = reader.read_batch(2).await;

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(third.len(), 1);
        assert!(fourth.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_invalid_rows() {
        let content = format!("{}fund,,10,,,100.0,\nfund,,11,,,bogus,\nfund,,12,,,50.0,\n", HEADER);
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let batch = reader.read_batch(10).await;

        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn test_async_reader_empty_input() {
        let mut reader = AsyncReader::new(Cursor::new(HEADER.as_bytes().to_vec()));

        let batch = reader.read_batch(10).await;

        assert!(batch.is_empty());
    }
}
