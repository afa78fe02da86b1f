//! HTTP client for the photo archive download endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::DownloadConfig;
use crate::orders::normalize_secure_id;
use crate::status::BROWSER_USER_AGENT;

use super::extract::extract_archive;
use super::types::DownloadRequest;
use super::{DownloadError, Downloader};

/// Downloader backed by the image-CD API.
///
/// The endpoint expects the order id and the uppercased pickup code as path
/// segments plus the web client's access key (`aak`) and version as query
/// parameters. The access key expires; it is configuration and has to be
/// refreshed by hand when the endpoint starts answering 403/404.
pub struct HttpDownloadClient {
    client: Client,
    config: DownloadConfig,
}

impl HttpDownloadClient {
    /// Create a new client from the download configuration.
    pub fn new(config: DownloadConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .default_headers(default_headers())
            .build()
            .map_err(|e| DownloadError::Request(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the archive URL (without query parameters).
    fn build_download_url(&self, order_id: &str, secure_id: &str) -> String {
        format!(
            "{}/{}/{}/download",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(order_id),
            urlencoding::encode(&normalize_secure_id(secure_id))
        )
    }

    /// Stream the response body into a temporary archive inside `dir`.
    async fn save_archive(
        &self,
        mut response: reqwest::Response,
        dir: &Path,
        order_id: &str,
    ) -> Result<NamedTempFile, DownloadError> {
        let archive = tempfile::Builder::new()
            .prefix("photos_")
            .suffix(".zip")
            .tempfile_in(dir)
            .map_err(|e| DownloadError::io(dir, e))?;

        let handle = archive
            .reopen()
            .map_err(|e| DownloadError::io(archive.path(), e))?;
        let mut file = tokio::fs::File::from_std(handle);

        let total = response.content_length();
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(DownloadError::from_send)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(archive.path(), e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| DownloadError::io(archive.path(), e))?;

        debug!(
            order_id,
            bytes = written,
            expected = ?total,
            archive = %archive.path().display(),
            "Archive saved"
        );
        Ok(archive)
    }
}

#[async_trait]
impl Downloader for HttpDownloadClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn download(&self, request: &DownloadRequest) -> Result<usize, DownloadError> {
        let url = self.build_download_url(&request.order_id, &request.secure_id);
        info!(
            order_id = %request.order_id,
            output_dir = %request.output_dir.display(),
            "Downloading photos"
        );

        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| DownloadError::DirectoryCreationFailed {
                path: request.output_dir.clone(),
                source: e,
            })?;

        let response = self
            .client
            .get(&url)
            .query(&[
                ("aak", self.config.access_key.as_str()),
                ("clientVersion", self.config.client_version.as_str()),
            ])
            .send()
            .await
            .map_err(DownloadError::from_send)?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND {
            return Err(DownloadError::AccessRejected {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let archive = self
            .save_archive(response, &request.output_dir, &request.order_id)
            .await?;

        // The temporary archive is dropped (and deleted) inside the blocking
        // task, whether extraction succeeds or not.
        let dest: PathBuf = request.output_dir.clone();
        tokio::task::spawn_blocking(move || {
            let result = extract_archive(archive.path(), &dest);
            drop(archive);
            result
        })
        .await
        .map_err(|e| DownloadError::Archive(format!("Extraction task failed: {}", e)))?
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://www.cewe-myphotos.com/"),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers
}
