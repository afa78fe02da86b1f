pub mod config;
pub mod download;
pub mod orders;
pub mod pacing;
pub mod pipeline;
pub mod report;
pub mod status;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use download::{
    DownloadError, DownloadOutcome, DownloadRequest, DownloadStatus, Downloader,
    HttpDownloadClient,
};
pub use orders::{OrderFile, OrderFiles, OrderRecord, OrderSource, OrderSourceError};
pub use pacing::{FixedDelayPacer, NoDelayPacer, Pacer};
pub use pipeline::{OrderRunner, RunOptions};
pub use report::{
    print_report, read_results, render_report, write_results, ReportError, RunReport,
    RunSummary,
};
pub use status::{
    HttpStatusClient, OrderStatus, StatusChecker, StatusError, StatusOutcome, StatusResult,
};
