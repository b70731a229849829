//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over replay commands from a CSV event
//! file. Delegates CSV format concerns to the `csv_format` module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found) are returned from `new()`
//! - Individual row parsing errors are yielded as `Err` variants with the
//!   line number for debugging
//!
//! # Memory Efficiency
//!
//! Rows are read one at a time; memory usage does not grow with file size.

use crate::io::csv_format::{convert_event_row, EventRow, ReplayCommand};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV event reader
///
/// Provides an iterator interface over replay commands.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader trims whitespace from all fields and allows flexible
    /// field counts, since most columns are unused for most event kinds.
    ///
    /// # Errors
    ///
    /// Returns a message if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<ReplayCommand, String>;

    /// Get the next replay command from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(ReplayCommand))` - successfully parsed row
    /// * `Some(Err(String))` - parse or conversion error with line number
    /// * `None` - end of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<EventRow>();

        match deserializer.next()? {
            Ok(event_row) => {
                self.line_num += 1;
                Some(
                    convert_event_row(event_row)
                        .map_err(|e| format!("Line {}: {}", self.line_num + 1, e)),
                )
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(format!(
                    "Line {}: CSV parse error: {}",
                    self.line_num + 1,
                    e
                )))
            }
        }
    }
}
