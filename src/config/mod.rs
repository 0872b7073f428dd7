// Configuration module

mod models;

pub use models::*;

use crate::error::ConfigError;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

/// Environment variable the hosting platform uses to bind the AI backend secret.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (`DIARY_EDGE__SECTION__FIELD`)
    /// 2. Config file (explicit path, or `~/.diary-edge/config.toml` if present)
    /// 3. Defaults (lowest)
    ///
    /// CLI flags are applied on top by the caller.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p.to_path_buf()).required(true),
            None => File::from(Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix("DIARY_EDGE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()?;

        let mut loaded: AppConfig = config.try_deserialize()?;
        loaded.apply_platform_secrets(std::env::var(GEMINI_API_KEY_ENV).ok());
        loaded.validate()?;
        Ok(loaded)
    }

    /// Fill the AI key from the platform secret binding when no configured key exists.
    /// Blank keys count as absent.
    pub fn apply_platform_secrets(&mut self, env_key: Option<String>) {
        let configured = self
            .gemini
            .api_key
            .take()
            .filter(|k| !k.trim().is_empty());
        self.gemini.api_key = configured.or_else(|| env_key.filter(|k| !k.trim().is_empty()));
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_requests must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.window_ms must be greater than zero".to_string(),
            ));
        }
        if self.ogp.fetch_timeout_seconds == 0 || self.gemini.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("timeouts must be greater than zero".to_string()));
        }
        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".diary-edge")
            .join("config.toml")
    }
}
