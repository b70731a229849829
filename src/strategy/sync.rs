//! Sequential replay strategy
//!
//! Single-threaded implementation of the `ReplayStrategy` trait. It
//! orchestrates the pipeline, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - event processing to `EscrowEngine` (business logic)
//! - CSV output to `csv_format::write_orders_csv` (format handling)
//!
//! Rows are streamed one at a time, so memory usage is bounded by the
//! number of orders, not the number of events.

use crate::core::EscrowEngine;
use crate::io::csv_format::write_orders_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{apply_command, ReplayStrategy};
use std::io::Write;
use std::path::Path;

/// Sequential replay strategy
///
/// Replays every event in file order on the calling thread. Send + Sync so
/// it satisfies the `ReplayStrategy` trait even though it never spawns.
#[derive(Debug, Clone, Copy)]
pub struct SyncReplayStrategy;

impl ReplayStrategy for SyncReplayStrategy {
    /// Process events from the input file and write summaries to output
    ///
    /// Fatal errors (file not found) are returned immediately. Rejected
    /// events and malformed rows are logged and replay continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let engine = EscrowEngine::new();

        let reader = SyncReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(command) => {
                    if let Err(e) = apply_command(&engine, command) {
                        tracing::warn!(error = %e, "replay event rejected");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "CSV row skipped");
                }
            }
        }

        write_orders_csv(&engine.orders(), output)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "event,order,actor,peer,conversation,amount,detail\n";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_strategy_replays_full_lifecycle() {
        let content = format!(
            "{}\
            fund,,10,,,100.0,\n\
            open,1,10,20,700,100.0,cover artwork\n\
            accept,1,20,,,,\n\
            start,1,20,,,,\n\
            deliver,1,20,,,,\n\
            confirm,1,10,,,,\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let strategy = SyncReplayStrategy;
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "order,status,amount,revisions\n1,released,100.0000,0\n"
        );
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let strategy = SyncReplayStrategy;
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_strategy_continues_past_rejected_events() {
        // The second accept is illegal and the bogus row is malformed;
        // both are skipped and the remaining events still apply
        let content = format!(
            "{}\
            fund,,10,,,50.0,\n\
            open,2,10,20,701,50.0,\n\
            accept,2,20,,,,\n\
            accept,2,20,,,,\n\
            bogus,2,20,,,,\n\
            start,2,20,,,,\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let strategy = SyncReplayStrategy;
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "order,status,amount,revisions\n2,in_progress,50.0000,0\n"
        );
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncReplayStrategy>();
    }
}
