use std::{fs::OpenOptions, str::FromStr, sync::Arc};

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to open log file: {0}")]
    File(#[from] std::io::Error),
    #[error("failed to init logger: {0}")]
    Init(Box<dyn std::error::Error + Send + Sync>),
}

/// Install the global subscriber: compact lines to stdout, or appended to
/// `APP_SERVER_LOG` without colours.
///
/// # Errors
///
/// Fails on a bad `RUST_LOG`, an unwritable log file, or a second call.
pub fn init(config: &AppConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::from_str(&config.log_filter)?;
    let builder = tracing_subscriber::fmt()
        .compact()
        .with_target(true)
        .with_env_filter(filter);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .try_init()
                .map_err(LoggingError::Init)?;
        }
        None => builder.try_init().map_err(LoggingError::Init)?,
    }

    tracing::debug!(filter = %config.log_filter, "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = AppConfig {
            log_filter: "crudcore=loud".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(init(&config), Err(LoggingError::InvalidFilter(_))));
    }
}
