use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fotocheck_core::{
    load_config, load_default_config, print_report, validate_config, write_results, Config,
    FixedDelayPacer, HttpDownloadClient, HttpStatusClient, OrderRunner, OrderSource, RunOptions,
    SanitizedConfig,
};

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "fotocheck.toml";

#[derive(Parser, Debug)]
#[command(
    name = "fotocheck",
    version,
    about = "Check photo print order status and download ready orders"
)]
struct Cli {
    /// Download photos for orders that are ready for pickup and have a secure id
    #[arg(long)]
    download: bool,

    /// Configuration file (TOML)
    #[arg(long, env = "FOTOCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory containing the order CSV files
    #[arg(long)]
    orders_dir: Option<PathBuf>,

    /// Also write the full report as JSON to this file
    #[arg(long)]
    results: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // stdout carries the report, logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = resolve_config(cli.config.as_deref())?;

    if let Some(dir) = cli.orders_dir {
        config.orders.dir = dir;
    }
    if let Some(path) = cli.results {
        config.report.results_file = Some(path);
    }

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        config = %serde_json::to_string(&sanitized).unwrap_or_default(),
        "Configuration loaded"
    );

    let status_client =
        HttpStatusClient::new(&config.status).context("Failed to create status client")?;
    let download_client = HttpDownloadClient::new(config.download.clone())
        .context("Failed to create download client")?;
    let pacer = FixedDelayPacer::from_millis(config.status.request_delay_ms);

    let options = if cli.download {
        info!(dir = %config.downloads.dir.display(), "Download mode enabled");
        RunOptions::with_downloads(&config.downloads.dir)
    } else {
        RunOptions::status_only()
    };

    let files = OrderSource::open(&config.orders.dir, &config.orders.skip_files)
        .with_context(|| format!("Cannot read orders from {}", config.orders.dir.display()))?;

    let runner = OrderRunner::new(status_client, download_client, pacer, options);
    let report = runner.run(files).await;

    print_report(&report).context("Failed to print report")?;

    if let Some(path) = &config.report.results_file {
        match write_results(path, &report) {
            Ok(()) => info!(path = %path.display(), "Results written"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to write results file"),
        }
    }

    Ok(())
}

/// Pick the configuration source: an explicit file must exist, otherwise
/// `fotocheck.toml` is used when present and built-in defaults when not.
fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        info!("Loading configuration from {:?}", path);
        return load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        info!("Loading configuration from {:?}", default_path);
        return load_config(default_path)
            .with_context(|| format!("Failed to load config from {:?}", default_path));
    }

    warn!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
    load_default_config().context("Failed to load default configuration")
}
