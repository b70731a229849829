//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, summary output)
//! - `sync_reader` - synchronous CSV reader with iterator interface
//! - `async_reader` - asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{convert_event_row, write_orders_csv, EventRow, ReplayCommand};
pub use sync_reader::SyncReader;
