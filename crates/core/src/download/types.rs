//! Types for photo downloads.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::orders::{normalize_secure_id, OrderRecord};

/// A single archive download to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Order id as the download endpoint knows it.
    pub order_id: String,
    /// Uppercased pickup code.
    pub secure_id: String,
    /// Folder the archive is extracted into.
    pub output_dir: PathBuf,
}

impl DownloadRequest {
    /// Build the request for an order record.
    pub fn for_record(record: &OrderRecord, output_dir: PathBuf) -> Self {
        Self {
            order_id: record.download_key(),
            secure_id: normalize_secure_id(&record.secure_id),
            output_dir,
        }
    }
}

/// What happened to an order's photo download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadStatus {
    /// The archive was downloaded and extracted.
    Downloaded { files: usize },
    /// The output folder already had content, nothing was requested.
    AlreadyPresent,
    /// The download or extraction failed.
    Failed { reason: String },
}

/// Per-order download result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// Order id sent to the download endpoint.
    pub order_id: String,
    /// Resolved extraction folder.
    pub output_dir: PathBuf,
    pub status: DownloadStatus,
}

impl DownloadOutcome {
    pub fn downloaded(request: &DownloadRequest, files: usize) -> Self {
        Self::with_status(request, DownloadStatus::Downloaded { files })
    }

    pub fn already_present(request: &DownloadRequest) -> Self {
        Self::with_status(request, DownloadStatus::AlreadyPresent)
    }

    pub fn failed(request: &DownloadRequest, reason: impl Into<String>) -> Self {
        Self::with_status(
            request,
            DownloadStatus::Failed {
                reason: reason.into(),
            },
        )
    }

    fn with_status(request: &DownloadRequest, status: DownloadStatus) -> Self {
        Self {
            order_id: request.order_id.clone(),
            output_dir: request.output_dir.clone(),
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.status, DownloadStatus::Failed { .. })
    }

    pub fn display(&self) -> String {
        match &self.status {
            DownloadStatus::Downloaded { files } => format!("✅ Downloaded ({} files)", files),
            DownloadStatus::AlreadyPresent => "✅ Already downloaded".to_string(),
            DownloadStatus::Failed { reason } => format!("❌ {}", reason),
        }
    }
}

/// Pick the extraction folder for an order.
///
/// Priority: the row's `output_path`, then `<downloads_dir>/<identifier>`
/// (spaces and path separators replaced by `_`), then `downloads_dir` itself.
pub fn resolve_output_dir(record: &OrderRecord, downloads_dir: &Path) -> PathBuf {
    if !record.output_path.is_empty() {
        PathBuf::from(&record.output_path)
    } else if !record.identifier.is_empty() {
        downloads_dir.join(folder_name(&record.identifier))
    } else {
        downloads_dir.to_path_buf()
    }
}

fn folder_name(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Whether `dir` exists and contains at least one entry.
pub fn dir_has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_wins() {
        let record = OrderRecord::new("1", "2")
            .with_identifier("Holiday")
            .with_output_path("/tmp/x");
        assert_eq!(
            resolve_output_dir(&record, Path::new("downloads")),
            PathBuf::from("/tmp/x")
        );
    }

    #[test]
    fn test_identifier_folder_under_downloads() {
        let record = OrderRecord::new("1", "2").with_identifier("Summer Holiday 2024");
        assert_eq!(
            resolve_output_dir(&record, Path::new("downloads")),
            PathBuf::from("downloads/Summer_Holiday_2024")
        );
    }

    #[test]
    fn test_identifier_cannot_escape_downloads() {
        let record = OrderRecord::new("1", "2").with_identifier("../etc");
        assert_eq!(
            resolve_output_dir(&record, Path::new("downloads")),
            PathBuf::from("downloads/.._etc")
        );
    }

    #[test]
    fn test_no_identifier_uses_downloads_dir() {
        let record = OrderRecord::new("1", "2");
        assert_eq!(
            resolve_output_dir(&record, Path::new("downloads")),
            PathBuf::from("downloads")
        );
    }

    #[test]
    fn test_request_uses_download_key_and_uppercase_secure_id() {
        let record = OrderRecord {
            order_number: "050842".to_string(),
            shop_number: "541032".to_string(),
            secure_id: "preh1".to_string(),
            cewe_order_id: "123456".to_string(),
            ..Default::default()
        };
        let request = DownloadRequest::for_record(&record, PathBuf::from("out"));
        assert_eq!(request.order_id, "541032-123456");
        assert_eq!(request.secure_id, "PREH1");
    }

    #[test]
    fn test_dir_has_entries() {
        let dir = TempDir::new().unwrap();
        assert!(!dir_has_entries(dir.path()));
        assert!(!dir_has_entries(&dir.path().join("missing")));

        fs::write(dir.path().join("photo.jpg"), b"jpg").unwrap();
        assert!(dir_has_entries(dir.path()));
    }

    #[test]
    fn test_outcome_display() {
        let request = DownloadRequest {
            order_id: "1-2".to_string(),
            secure_id: "X".to_string(),
            output_dir: PathBuf::from("out"),
        };
        assert_eq!(
            DownloadOutcome::downloaded(&request, 3).display(),
            "✅ Downloaded (3 files)"
        );
        assert_eq!(
            DownloadOutcome::already_present(&request).display(),
            "✅ Already downloaded"
        );
        let failed = DownloadOutcome::failed(&request, "Download failed");
        assert_eq!(failed.display(), "❌ Download failed");
        assert!(!failed.is_success());
    }
}
