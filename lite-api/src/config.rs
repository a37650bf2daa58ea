//! Runtime settings, layered lowest precedence first: built-in defaults,
//! optional `lite-api.{toml,yaml,json}` file, environment, CLI flags.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::client::HotelbedsConfig;

pub const DEFAULT_APP_PORT: &str = ":8080";
pub const DEFAULT_MODE: &str = "dev";
pub const DEFAULT_HOTELBEDS_HOST: &str = "https://api.test.hotelbeds.com";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("error loading settings: {0}")]
    Load(#[from] ConfigError),
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub app_port: String,
    pub mode: String,
    pub hotelbeds_host: String,
    pub hotelbeds_api_key: String,
    pub hotelbeds_secret: String,
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub app_port: Option<String>,
    pub mode: Option<String>,
    pub hotelbeds_host: Option<String>,
    pub hotelbeds_api_key: Option<String>,
    pub hotelbeds_secret: Option<String>,
}

impl Settings {
    /// Load from the working directory file and the process environment.
    pub fn load(overrides: Overrides) -> Result<Self, SettingsError> {
        Self::from_sources(Environment::default(), overrides)
    }

    fn from_sources(env: Environment, overrides: Overrides) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("app_port", DEFAULT_APP_PORT)?
            .set_default("mode", DEFAULT_MODE)?
            .set_default("hotelbeds_host", DEFAULT_HOTELBEDS_HOST)?
            .set_default("hotelbeds_api_key", "")?
            .set_default("hotelbeds_secret", "")?
            .add_source(File::with_name("lite-api").required(false))
            .add_source(env)
            .set_override_option("app_port", overrides.app_port)?
            .set_override_option("mode", overrides.mode)?
            .set_override_option("hotelbeds_host", overrides.hotelbeds_host)?
            .set_override_option("hotelbeds_api_key", overrides.hotelbeds_api_key)?
            .set_override_option("hotelbeds_secret", overrides.hotelbeds_secret)?
            .build()?
            .try_deserialize()?;

        if settings.hotelbeds_api_key.trim().is_empty() {
            return Err(SettingsError::Missing("HOTELBEDS_API_KEY"));
        }
        if settings.hotelbeds_secret.trim().is_empty() {
            return Err(SettingsError::Missing("HOTELBEDS_SECRET"));
        }

        Ok(settings)
    }

    /// Socket address to listen on. A bare port (`8080` or `:8080`) binds
    /// every interface.
    pub fn bind_addr(&self) -> String {
        let port = self.app_port.trim();
        if let Some(bare) = port.strip_prefix(':') {
            return format!("0.0.0.0:{bare}");
        }
        if port.contains(':') {
            port.to_string()
        } else {
            format!("0.0.0.0:{port}")
        }
    }

    pub fn is_dev(&self) -> bool {
        self.mode.eq_ignore_ascii_case("dev")
    }

    pub fn supplier(&self) -> HotelbedsConfig {
        HotelbedsConfig {
            host: self.hotelbeds_host.clone(),
            api_key: self.hotelbeds_api_key.clone(),
            secret: self.hotelbeds_secret.clone(),
        }
    }
}
