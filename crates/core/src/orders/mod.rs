//! Order source: reads order records from a directory of CSV files.
//!
//! Each `.csv` file in the orders directory (non-recursive) holds one order
//! per row with the header
//! `order_number,shop_number,identifier[,secure_id][,cewe_order_id][,output_path]`.
//! Header names are matched case-insensitively.
//!
//! Only a missing or unreadable orders directory is fatal. A file that
//! cannot be read is reported and skipped; a row without the required
//! fields is reported and skipped.

mod reader;
mod types;

pub use reader::{parse_orders, read_order_file, OrderFiles, OrderSource};
pub use types::{normalize_secure_id, OrderFile, OrderRecord, SkippedRow, ORDER_KEY_SEPARATOR};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading order files.
#[derive(Debug, Error)]
pub enum OrderSourceError {
    /// The orders directory does not exist.
    #[error("Orders directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// The orders directory exists but cannot be listed.
    #[error("Failed to read orders directory: {path}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single order file could not be opened or decoded.
    #[error("Failed to read order file {filename}: {reason}")]
    ReadFile { filename: String, reason: String },

    /// A single order file lacks required header columns.
    #[error("Order file {filename} is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        filename: String,
        columns: Vec<String>,
    },
}

impl OrderSourceError {
    /// Whether this error aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. } | Self::ReadDirectory { .. }
        )
    }

    /// The order file this error belongs to, if any.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::ReadFile { filename, .. } | Self::MissingColumns { filename, .. } => {
                Some(filename)
            }
            _ => None,
        }
    }
}
