//! Configuration file types.
//!
//! Configuration is a single JSON document naming the device and the
//! dashboard behaviour options:
//!
//! ```json
//! {
//!   "device": { "host": "192.168.1.50", "port": 80 },
//!   "dashboard": { "bodyEncoding": "form", "chartOrdering": "sorted-by-timestamp" }
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::options::DashboardOptions;

/// Address of the device when it runs its own access point.
pub const DEFAULT_HOST: &str = "192.168.4.1";

/// Port the device's web server listens on.
pub const DEFAULT_PORT: u16 = 80;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("Invalid config {path}: {source}")]
    InvalidData {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the device lives on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl DeviceConfig {
    /// `host:port` authority used for both HTTP and the push channel.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub dashboard: DashboardOptions,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Load configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::InvalidData {
        path: path.display().to_string(),
        source,
    })
}
