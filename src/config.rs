use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://app.db?mode=rwc";
pub const DEFAULT_API_PREFIX: &str = "v1";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server settings, read from the environment.
///
/// | Variable | Default |
/// |---|---|
/// | `APP_SERVER_HOST` | `0.0.0.0` |
/// | `APP_SERVER_PORT` | `8001` |
/// | `DATABASE_URL` | `sqlite://app.db?mode=rwc` |
/// | `APP_API_PREFIX` | `v1` |
/// | `APP_SERVER_LOG` | unset, logs go to stdout |
/// | `RUST_LOG` | `info` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Without surrounding slashes; empty mounts resources at the root.
    pub api_prefix: String,
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            log_file: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for values that do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for values that do not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match get("APP_SERVER_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|err| ConfigError::Invalid {
                key: "APP_SERVER_PORT",
                value: raw.clone(),
                reason: err.to_string(),
            })?,
            None => defaults.port,
        };

        let api_prefix = match lookup("APP_API_PREFIX") {
            Some(raw) => raw.trim().trim_matches('/').to_string(),
            None => defaults.api_prefix,
        };

        Ok(Self {
            host: get("APP_SERVER_HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            api_prefix,
            log_file: get("APP_SERVER_LOG").map(PathBuf::from),
            log_filter: get("RUST_LOG").unwrap_or(defaults.log_filter),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
