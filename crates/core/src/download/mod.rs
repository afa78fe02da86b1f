//! Photo archive download for orders that are ready for pickup.
//!
//! This module provides the `Downloader` trait and its HTTP implementation.
//! A download fetches one ZIP archive per order and extracts it into the
//! order's output folder.
//!
//! # Guarantees
//!
//! - The archive is staged in a temporary file that is removed after
//!   extraction, on success and on failure
//! - Files already present in the output folder are never deleted
//! - Parent directories of the output folder are created as needed

mod client;
mod extract;
mod types;

pub use client::HttpDownloadClient;
pub use extract::extract_archive;
pub use types::{
    dir_has_entries, resolve_output_dir, DownloadOutcome, DownloadRequest, DownloadStatus,
};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while downloading and extracting photos.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// 403/404: the access key expired or the secure id does not match.
    #[error("Access rejected (HTTP {status}): access key expired or secure id invalid")]
    AccessRejected { status: u16 },

    /// Any other non-success HTTP status.
    #[error("Download failed with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request did not finish within the client timeout.
    #[error("Download timed out")]
    Timeout,

    /// The endpoint could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other request failure.
    #[error("Request failed: {0}")]
    Request(String),

    /// The output folder could not be created.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be read.
    #[error("Archive error: {0}")]
    Archive(String),
}

impl DownloadError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }

    /// Whether the access key / secure id combination was refused.
    pub fn is_access_rejected(&self) -> bool {
        matches!(self, Self::AccessRejected { .. })
    }
}

/// Downloads and extracts the photo archive of an order.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Returns the name of this downloader implementation.
    fn name(&self) -> &str;

    /// Download the archive for `request` and extract it into
    /// `request.output_dir`. Returns the number of extracted files.
    async fn download(&self, request: &DownloadRequest) -> Result<usize, DownloadError>;
}
