use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub orders: OrdersConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where order CSV files are read from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrdersConfig {
    #[serde(default = "default_orders_dir")]
    pub dir: PathBuf,
    /// File names (case-insensitive) that are never treated as order files.
    #[serde(default = "default_skip_files")]
    pub skip_files: Vec<String>,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            dir: default_orders_dir(),
            skip_files: default_skip_files(),
        }
    }
}

fn default_orders_dir() -> PathBuf {
    PathBuf::from("orders")
}

fn default_skip_files() -> Vec<String> {
    vec!["orders_template.csv".to_string()]
}

/// Root folder for extracted photos
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadsConfig {
    #[serde(default = "default_downloads_dir")]
    pub dir: PathBuf,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dir: default_downloads_dir(),
        }
    }
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

/// Order status endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    /// Status endpoint URL (query parameters are appended)
    #[serde(default = "default_status_url")]
    pub base_url: String,
    /// Fixed configuration id sent as the `config` query parameter
    #[serde(default = "default_config_id")]
    pub config_id: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_status_timeout")]
    pub timeout_secs: u32,
    /// Minimum pause between two status requests in milliseconds (default: 600)
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            base_url: default_status_url(),
            config_id: default_config_id(),
            timeout_secs: default_status_timeout(),
            request_delay_ms: default_request_delay(),
        }
    }
}

fn default_status_url() -> String {
    "https://spot.photoprintit.com/spotapi/orderInfo/order".to_string()
}

fn default_config_id() -> String {
    "1320".to_string()
}

fn default_status_timeout() -> u32 {
    10
}

fn default_request_delay() -> u64 {
    600
}

/// Photo download endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Download API base URL (e.g., "https://api.cewe-myphotos.com/api/imageCD")
    #[serde(default = "default_download_url")]
    pub base_url: String,
    /// API access key (`aak`). Expires from time to time and has to be
    /// refreshed from the provider's web client.
    #[serde(default = "default_access_key")]
    pub access_key: String,
    /// Web client version sent alongside the access key
    #[serde(default = "default_client_version")]
    pub client_version: String,
    /// Request timeout in seconds (default: 300)
    #[serde(default = "default_download_timeout")]
    pub timeout_secs: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: default_download_url(),
            access_key: default_access_key(),
            client_version: default_client_version(),
            timeout_secs: default_download_timeout(),
        }
    }
}

fn default_download_url() -> String {
    "https://api.cewe-myphotos.com/api/imageCD".to_string()
}

fn default_access_key() -> String {
    "8ccc7bec8f9899140873db6b01254f35cc3a04ed".to_string()
}

fn default_client_version() -> String {
    "2.116.1-20251022-gd981d25".to_string()
}

fn default_download_timeout() -> u32 {
    300
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportConfig {
    /// When set, the full run report is also written to this JSON file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_file: Option<PathBuf>,
}

/// Sanitized config for logging (access key redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub orders: OrdersConfig,
    pub downloads: DownloadsConfig,
    pub status: StatusConfig,
    pub download: SanitizedDownloadConfig,
    pub report: ReportConfig,
}

/// Sanitized download config (access key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDownloadConfig {
    pub base_url: String,
    pub access_key_configured: bool,
    pub client_version: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            orders: config.orders.clone(),
            downloads: config.downloads.clone(),
            status: config.status.clone(),
            download: SanitizedDownloadConfig {
                base_url: config.download.base_url.clone(),
                access_key_configured: !config.download.access_key.is_empty(),
                client_version: config.download.client_version.clone(),
                timeout_secs: config.download.timeout_secs,
            },
            report: config.report.clone(),
        }
    }
}
