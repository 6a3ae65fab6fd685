//! Configuration loading from files and the environment

use crate::{AppConfig, ConfigError, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, picking the format from the
    /// extension (TOML or JSON).
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;

        match extension {
            "toml" => Self::from_toml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}",
                extension
            ))),
        }
    }

    pub fn from_toml(content: &str) -> Result<AppConfig> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<AppConfig> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `SWAPMEET_*` environment variables.
    ///
    /// Nesting uses a double underscore so single underscores stay inside
    /// key names: `SWAPMEET_DISCOVERY__PAGE_SIZE=5`,
    /// `SWAPMEET_LOGGING__LEVEL=debug`.
    pub fn from_env() -> Result<AppConfig> {
        Self::from_env_with_prefix("SWAPMEET")
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<AppConfig> {
        let config = Config::builder()
            .add_source(Self::env_source(prefix))
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a file and overlay environment variables on top of it.
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<AppConfig> {
        let content = std::fs::read_to_string(path)?;
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            other => {
                return Err(ConfigError::LoadError(format!(
                    "Unsupported file extension: {:?}",
                    other
                )))
            }
        };

        let config = Config::builder()
            .add_source(File::from_str(&content, format))
            .add_source(Self::env_source(env_prefix))
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    // `try_parsing` lets numeric env strings deserialize into typed fields.
    fn env_source(prefix: &str) -> Environment {
        Environment::with_prefix(prefix)
            .separator("__")
            .try_parsing(true)
    }
}
