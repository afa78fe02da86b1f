//! Run pipeline: drives every order through status check and optional download.
//!
//! Processing is strictly sequential, in file order and then row order.
//! Nothing that goes wrong with a single file or order stops the run; the
//! failure is recorded in the [`RunReport`] and the next item is processed.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::download::{
    dir_has_entries, resolve_output_dir, DownloadOutcome, DownloadRequest, Downloader,
};
use crate::orders::{OrderFile, OrderFiles, OrderRecord};
use crate::pacing::Pacer;
use crate::report::{FileReport, RunReport, SkippedFile};
use crate::status::{StatusChecker, StatusOutcome, StatusResult};

/// Settings for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Whether ready orders with a pickup code should be downloaded.
    pub downloads_enabled: bool,
    /// Parent folder for orders without an explicit output path.
    pub downloads_dir: PathBuf,
}

impl RunOptions {
    pub fn status_only() -> Self {
        Self {
            downloads_enabled: false,
            downloads_dir: PathBuf::from("downloads"),
        }
    }

    pub fn with_downloads(downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloads_enabled: true,
            downloads_dir: downloads_dir.into(),
        }
    }
}

/// Sequential order processor.
pub struct OrderRunner<S, D, P>
where
    S: StatusChecker,
    D: Downloader,
    P: Pacer,
{
    checker: S,
    downloader: D,
    pacer: P,
    options: RunOptions,
}

impl<S, D, P> OrderRunner<S, D, P>
where
    S: StatusChecker,
    D: Downloader,
    P: Pacer,
{
    pub fn new(checker: S, downloader: D, pacer: P, options: RunOptions) -> Self {
        Self {
            checker,
            downloader,
            pacer,
            options,
        }
    }

    /// Process every order file and collect the results.
    pub async fn run(&self, files: OrderFiles) -> RunReport {
        let downloads_enabled = self.options.downloads_enabled && self.prepare_downloads_dir();
        let mut report = RunReport::new(downloads_enabled);

        info!(
            files = files.remaining(),
            checker = self.checker.name(),
            downloader = self.downloader.name(),
            downloads_enabled,
            "Starting order run"
        );

        for file in files {
            match file {
                Ok(file) => {
                    let file_report = self.process_file(file, downloads_enabled).await;
                    report.files.push(file_report);
                }
                Err(e) => {
                    let filename = e.filename().unwrap_or("<unknown>").to_string();
                    error!(file = %filename, error = %e, "Skipping unreadable order file");
                    report.skipped_files.push(SkippedFile {
                        filename,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let summary = report.summary();
        info!(
            files = summary.files,
            orders = summary.orders,
            ready = summary.ready_for_pickup,
            status_errors = summary.status_errors,
            downloaded = summary.downloaded,
            download_failures = summary.download_failures,
            "Order run finished"
        );

        report
    }

    /// Create the downloads folder up front. Returns false when downloads
    /// have to be disabled for this run.
    fn prepare_downloads_dir(&self) -> bool {
        let dir = &self.options.downloads_dir;
        match fs::create_dir_all(dir) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    dir = %dir.display(),
                    error = %e,
                    "Cannot create downloads directory, continuing with status checks only"
                );
                false
            }
        }
    }

    async fn process_file(&self, file: OrderFile, downloads_enabled: bool) -> FileReport {
        info!(
            file = %file.filename,
            orders = file.records.len(),
            skipped_rows = file.skipped_rows.len(),
            "Processing order file"
        );

        let mut file_report = FileReport::new(file.filename);
        file_report.skipped_rows = file.skipped_rows;

        for record in file.records {
            let result = self.process_order(record, downloads_enabled).await;
            file_report.results.push(result);
        }

        file_report
    }

    /// Check one order and download it when eligible. The pacer's delay
    /// runs from the end of this order to the next status request.
    async fn process_order(&self, record: OrderRecord, downloads_enabled: bool) -> StatusResult {
        self.pacer.wait().await;

        let order_key = record.resolved_key();
        let outcome = match self.checker.check(&record).await {
            Ok(status) => {
                debug!(order = %order_key, code = %status.code, "Status received");
                StatusOutcome::Checked(status)
            }
            Err(e) => {
                warn!(order = %order_key, error = %e, "Status check failed");
                StatusOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        let eligible = downloads_enabled && record.has_secure_id() && outcome.is_ready_for_pickup();
        let download = if eligible {
            Some(self.download_order(&record).await)
        } else {
            None
        };

        self.pacer.finished().await;

        let mut result = StatusResult::new(record, outcome);
        result.download = download;
        result
    }

    async fn download_order(&self, record: &OrderRecord) -> DownloadOutcome {
        let output_dir = resolve_output_dir(record, &self.options.downloads_dir);
        let request = DownloadRequest::for_record(record, output_dir);

        if dir_has_entries(&request.output_dir) {
            info!(
                order = %request.order_id,
                dir = %request.output_dir.display(),
                "Photos already present, skipping download"
            );
            return DownloadOutcome::already_present(&request);
        }

        match self.downloader.download(&request).await {
            Ok(files) => {
                info!(order = %request.order_id, files, "Photos downloaded");
                DownloadOutcome::downloaded(&request, files)
            }
            Err(e) => {
                if e.is_access_rejected() {
                    warn!(order = %request.order_id, error = %e, "Download rejected");
                } else {
                    error!(order = %request.order_id, error = %e, "Download failed");
                }
                DownloadOutcome::failed(&request, e.to_string())
            }
        }
    }
}
