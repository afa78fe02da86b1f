//! Run report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::download::DownloadStatus;
use crate::orders::SkippedRow;
use crate::status::StatusResult;

/// Results for one order file, in row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub filename: String,
    pub results: Vec<StatusResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_rows: Vec<SkippedRow>,
}

impl FileReport {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            results: Vec::new(),
            skipped_rows: Vec::new(),
        }
    }
}

/// An order file that could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Everything a run produced, grouped by order file in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub downloads_enabled: bool,
    pub files: Vec<FileReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<SkippedFile>,
}

impl RunReport {
    pub fn new(downloads_enabled: bool) -> Self {
        Self {
            generated_at: Utc::now(),
            downloads_enabled,
            files: Vec::new(),
            skipped_files: Vec::new(),
        }
    }

    /// Iterate over every order result across all files.
    pub fn results(&self) -> impl Iterator<Item = &StatusResult> {
        self.files.iter().flat_map(|f| f.results.iter())
    }

    /// `(file, order key, identifier, status text)` for every order, as printed.
    pub fn status_rows(&self) -> Vec<(String, String, String, String)> {
        self.files
            .iter()
            .flat_map(|file| {
                file.results.iter().map(move |r| {
                    (
                        file.filename.clone(),
                        r.order_key.clone(),
                        r.record.identifier.clone(),
                        r.outcome.display(),
                    )
                })
            })
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            files: self.files.len(),
            unreadable_files: self.skipped_files.len(),
            skipped_rows: self.files.iter().map(|f| f.skipped_rows.len()).sum(),
            ..Default::default()
        };

        for result in self.results() {
            summary.orders += 1;
            if result.outcome.is_failed() {
                summary.status_errors += 1;
            }
            if result.outcome.is_ready_for_pickup() {
                summary.ready_for_pickup += 1;
            }
            match result.download.as_ref().map(|d| &d.status) {
                Some(DownloadStatus::Downloaded { .. }) => summary.downloaded += 1,
                Some(DownloadStatus::AlreadyPresent) => summary.already_present += 1,
                Some(DownloadStatus::Failed { .. }) => summary.download_failures += 1,
                None => {}
            }
        }

        summary
    }
}

/// Counts shown at the end of the console report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub unreadable_files: usize,
    pub orders: usize,
    pub skipped_rows: usize,
    pub ready_for_pickup: usize,
    pub status_errors: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub download_failures: usize,
}
