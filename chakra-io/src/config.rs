//! Configuration for the ChakraIO control loop.
//!
//! One TOML file holds the drive tuning (`[drive.*]`), the simulated
//! hardware (`[sim]`), and logging. Missing sections use defaults.

use std::fs;
use std::path::Path;

use chakra_drive::DriveConfig;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::SimConfig;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use chakra_io::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("chakra.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.drive.validate()?;
        Ok(config)
    }
}
