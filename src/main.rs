//! Escrow Engine CLI
//!
//! Command-line interface for replaying marketplace escrow events from CSV
//! files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- events.csv > orders.csv
//! cargo run -- --strategy sync events.csv > orders.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 events.csv > orders.csv
//! ```
//!
//! The program reads replay events from the input CSV file, drives them
//! through the escrow engine using the selected strategy, and writes the
//! final order summaries to stdout. Logs go to stderr (configure with
//! `RUST_LOG`), so stdout stays clean CSV.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, etc.)

use escrow_engine::cli;
use escrow_engine::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!(error = %e, "replay failed");
        process::exit(1);
    }
}
