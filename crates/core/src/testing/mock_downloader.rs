//! Mock downloader for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::{DownloadError, DownloadRequest, Downloader};

/// Mock implementation of the Downloader trait.
///
/// A successful download creates the output folder and writes
/// `photo_<n>.jpg` files into it, so callers see the same filesystem
/// effect as a real extraction. Configured errors are returned once.
#[derive(Debug, Clone)]
pub struct MockDownloader {
    file_count: Arc<RwLock<usize>>,
    errors: Arc<RwLock<HashMap<String, DownloadError>>>,
    requests: Arc<RwLock<Vec<DownloadRequest>>>,
}

impl Default for MockDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDownloader {
    pub fn new() -> Self {
        Self {
            file_count: Arc::new(RwLock::new(1)),
            errors: Arc::new(RwLock::new(HashMap::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of files each successful download produces.
    pub async fn set_file_count(&self, count: usize) {
        *self.file_count.write().await = count;
    }

    /// Fail the next download of `order_id` with `error`.
    pub async fn set_error(&self, order_id: &str, error: DownloadError) {
        self.errors.write().await.insert(order_id.to_string(), error);
    }

    /// Requests received so far, in call order.
    pub async fn recorded_requests(&self) -> Vec<DownloadRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn download(&self, request: &DownloadRequest) -> Result<usize, DownloadError> {
        self.requests.write().await.push(request.clone());

        if let Some(err) = self.errors.write().await.remove(&request.order_id) {
            return Err(err);
        }

        let dir = &request.output_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DownloadError::DirectoryCreationFailed {
                path: dir.clone(),
                source: e,
            })?;

        let count = *self.file_count.read().await;
        for n in 1..=count {
            let path = dir.join(format!("photo_{}.jpg", n));
            tokio::fs::write(&path, b"jpeg")
                .await
                .map_err(|e| DownloadError::io(&path, e))?;
        }
        Ok(count)
    }
}
