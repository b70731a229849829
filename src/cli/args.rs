use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay marketplace escrow events with dispute arbitration
#[derive(Parser, Debug)]
#[command(name = "escrow-engine")]
#[command(about = "Replay marketplace escrow events with dispute arbitration", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing replay events
    #[arg(value_name = "INPUT", help = "Path to the input CSV event file")]
    pub input_file: PathBuf,

    /// Replay strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Replay strategy: 'sync' for sequential or 'async' for concurrent"
    )]
    pub strategy: StrategyType,

    /// Number of events per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of events per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of order groups replaying concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,
}

/// Available replay strategies
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Uses the provided values where given and defaults elsewhere;
    /// `BatchConfig::new` sanitizes out-of-range values.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}
