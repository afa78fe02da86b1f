use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Orders directory is set
/// - Both endpoint URLs are http(s) URLs
/// - Status config id is not empty
/// - Timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.orders.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "orders.dir cannot be empty".to_string(),
        ));
    }

    check_url("status.base_url", &config.status.base_url)?;
    check_url("download.base_url", &config.download.base_url)?;

    if config.status.config_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "status.config_id cannot be empty".to_string(),
        ));
    }

    if config.status.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "status.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.download.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "download.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

fn check_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must be an http(s) URL, got '{}'",
            field, url
        )))
    }
}
