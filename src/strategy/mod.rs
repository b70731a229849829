//! Replay strategy module
//!
//! This module defines the Strategy pattern for complete event-replay
//! pipelines, encompassing CSV parsing and engine processing. This allows
//! different replay implementations (sequential, concurrent batch) to be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::core::EscrowEngine;
use crate::io::ReplayCommand;
use crate::types::EscrowError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncReplayStrategy, BatchConfig};
pub use sync::SyncReplayStrategy;

/// Replay strategy trait for complete event-replay pipelines
///
/// Each strategy reads replay events from a CSV file, drives them through
/// the escrow engine, and writes the final order summaries to output.
pub trait ReplayStrategy: Send + Sync {
    /// Process events from the input file and write summaries to output
    ///
    /// Fatal errors (file not found, I/O failure) are returned; individual
    /// rejected events are logged and replay continues with the next row.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Drive one replay command through the engine
pub(crate) fn apply_command(
    engine: &EscrowEngine,
    command: ReplayCommand,
) -> Result<(), EscrowError> {
    match command {
        ReplayCommand::Fund { party, amount } => engine.fund(party, amount),
        ReplayCommand::Open(request) => engine.open(request).map(|_| ()),
        ReplayCommand::Apply {
            order,
            actor,
            event,
        } => engine.apply(order, actor, event).map(|_| ()),
    }
}

/// Create a replay strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - the type of strategy to create (Sync or Async)
/// * `config` - optional configuration for concurrent batch replay
///   (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ReplayStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncReplayStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncReplayStrategy::new(config))
        }
    }
}
