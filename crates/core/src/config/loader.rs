use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix for configuration overrides.
///
/// Nested keys use a double underscore, e.g. `FOTOCHECK_DOWNLOAD__ACCESS_KEY`.
pub const ENV_PREFIX: &str = "FOTOCHECK_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    base_figment()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from built-in defaults and environment variables only
pub fn load_default_config() -> Result<Config, ConfigError> {
    base_figment()
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn base_figment() -> Figment {
    Figment::new().merge(Serialized::defaults(Config::default()))
}

fn env_provider() -> Env {
    // FOTOCHECK_CONFIG names the config file itself and is not a setting
    Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__")
}
