//! Concurrent batch replay strategy
//!
//! Multi-threaded implementation of the `ReplayStrategy` trait. Events are
//! read in batches; within a batch, wallet funding rows apply first, then
//! the remaining rows are partitioned by order id and each order's rows
//! replay sequentially on their own task. Batches are processed one after
//! another so an order whose events span batches still sees them in file
//! order.
//!
//! # Architecture
//!
//! ```text
//! AsyncReplayStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── Arc<EscrowEngine> (thread-safe state, per-order locking)
//! ```
//!
//! The engine's own per-record locking makes the fan-out safe; the
//! partitioning exists to keep each order's events ordered, not to guard
//! state.

use crate::core::EscrowEngine;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::{write_orders_csv, ReplayCommand};
use crate::strategy::{apply_command, ReplayStrategy};
use crate::types::OrderId;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch replay
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of events per batch
    pub batch_size: usize,
    /// Maximum number of worker threads replaying order groups
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                given = batch_size,
                using = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                given = max_concurrent_batches,
                using = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Split a batch into funding rows and per-order event groups
///
/// Funding rows have no order and must apply before the order work of the
/// same batch. Each group keeps its rows in original file order.
fn partition_batch(
    batch: Vec<ReplayCommand>,
) -> (Vec<ReplayCommand>, HashMap<OrderId, Vec<ReplayCommand>>) {
    let mut funds = Vec::new();
    let mut groups: HashMap<OrderId, Vec<ReplayCommand>> = HashMap::new();

    for command in batch {
        match command.order() {
            None => funds.push(command),
            Some(order) => groups.entry(order).or_default().push(command),
        }
    }

    (funds, groups)
}

/// Concurrent batch replay strategy
///
/// Orders are independent in the engine, so different orders' event groups
/// replay in parallel; one order's events always replay sequentially.
#[derive(Debug, Clone)]
pub struct AsyncReplayStrategy {
    config: BatchConfig,
}

impl AsyncReplayStrategy {
    /// Create a new AsyncReplayStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ReplayStrategy for AsyncReplayStrategy {
    /// Process events from the input file and write summaries to output
    ///
    /// Builds a multi-threaded tokio runtime, streams batches from the CSV
    /// file, and fans each batch out by order id. Fatal errors are
    /// returned; rejected events are logged and replay continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let engine = Arc::new(EscrowEngine::new());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap the tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            // Batches replay sequentially so per-order ordering holds
            // across batch boundaries; parallelism lives inside the batch.
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let (funds, groups) = partition_batch(batch);

                for command in funds {
                    if let Err(e) = apply_command(&engine, command) {
                        tracing::warn!(error = %e, "funding row rejected");
                    }
                }

                let tasks: Vec<_> = groups
                    .into_iter()
                    .map(|(order, commands)| {
                        let engine = Arc::clone(&engine);
                        tokio::spawn(async move {
                            for command in commands {
                                if let Err(e) = apply_command(&engine, command) {
                                    tracing::warn!(order, error = %e, "replay event rejected");
                                }
                            }
                        })
                    })
                    .collect();

                for joined in futures::future::join_all(tasks).await {
                    if let Err(e) = joined {
                        tracing::warn!(error = %e, "replay task failed");
                    }
                }
            }

            write_orders_csv(&engine.orders(), output)?;

            Ok(())
        })
    }
}
