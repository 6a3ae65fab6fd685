//! Core configuration structures

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Discovery paging configuration
    #[serde(default)]
    pub discovery: DiscoverySection,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.discovery.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "discovery.page_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySection {
    /// Items fetched per store page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    1
}
