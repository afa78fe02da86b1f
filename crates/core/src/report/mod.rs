//! Report rendering and the optional JSON results file.
//!
//! Rendering is pure: [`render_report`] turns a [`RunReport`] into text and
//! [`print_report`] writes that text to stdout. The only filesystem side
//! effect lives in [`write_results`].

mod render;
mod results;
mod table;
mod types;

pub use render::{print_report, render_report};
pub use results::{read_results, write_results};
pub use table::{display_width, Table};
pub use types::{FileReport, RunReport, RunSummary, SkippedFile};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing or reading a results file.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid results JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
