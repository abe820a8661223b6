//! Configuration loader for Parley.
//!
//! Reads an optional TOML file into [`AppConfig`], then applies `PARLEY_*`
//! environment overrides. A missing file yields the defaults; a file that
//! exists but cannot be read or parsed is an error.

use std::path::Path;

use parley_types::config::{AppConfig, LogFormat};
use parley_types::error::ConfigError;

pub const ENV_HOST: &str = "PARLEY_HOST";
pub const ENV_PORT: &str = "PARLEY_PORT";
pub const ENV_DATABASE_URL: &str = "PARLEY_DATABASE_URL";
pub const ENV_LOG_FORMAT: &str = "PARLEY_LOG_FORMAT";
pub const ENV_LOG: &str = "PARLEY_LOG";

/// Load `.env` from the working directory, if present.
///
/// Returns the path that was loaded. Variables already set in the process
/// environment are never overwritten.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(err) if err.not_found() => None,
        Err(err) => {
            tracing::warn!("Failed to load .env: {err}");
            None
        }
    }
}

/// Load configuration from `path` (if any) and the process environment.
pub async fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path).await?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Parse a TOML config file. A missing file yields [`AppConfig::default()`].
pub async fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source: err,
            });
        }
    };

    toml::from_str::<AppConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so callers can supply their own source.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(port) = lookup(ENV_PORT) {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{ENV_PORT} must be a port number, got '{port}'")))?;
    }
    if let Some(url) = lookup(ENV_DATABASE_URL) {
        config.database.url = url;
    }
    if let Some(format) = lookup(ENV_LOG_FORMAT) {
        config.logging.format = format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::Invalid(format!("{ENV_LOG_FORMAT}: {e}")))?;
    }
    if let Some(filter) = lookup(ENV_LOG) {
        config.logging.filter = filter;
    }
    validate(config)
}

/// Reject settings that would only fail later at startup.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.database.url.trim().is_empty() {
        return Err(ConfigError::Invalid("database.url must not be empty".to_string()));
    }
    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "server.request_timeout_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
