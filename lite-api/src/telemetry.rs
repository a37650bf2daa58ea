//! Structured JSON logging via `tracing-subscriber`.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Debug, Error)]
#[error("invalid log level {0:?}, expected one of DEBUG, INFO, WARN, ERROR")]
pub struct InvalidLogLevel(pub String);

/// Level used when `RUST_LOG` is unset: an explicit `LOG_LEVEL` first,
/// otherwise `debug` in dev mode and `info` elsewhere.
pub fn resolve_level(log_level: Option<&str>, dev: bool) -> Result<Level, InvalidLogLevel> {
    let Some(raw) = log_level.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(if dev { Level::DEBUG } else { Level::INFO });
    };

    match raw.to_ascii_uppercase().as_str() {
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" => Ok(Level::WARN),
        "ERROR" => Ok(Level::ERROR),
        _ => Err(InvalidLogLevel(raw.to_string())),
    }
}

fn filter(level: Level) -> anyhow::Result<EnvFilter> {
    let level = level.as_str().to_ascii_lowercase();
    Ok(EnvFilter::default()
        .add_directive(format!("lite_api={level}").parse()?)
        .add_directive(format!("tower_http={level}").parse()?))
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// settings when present.
pub fn init(settings: &Settings) -> anyhow::Result<()> {
    let level = resolve_level(settings.log_level.as_deref(), settings.is_dev())?;

    let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => filter(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .init();

    Ok(())
}
