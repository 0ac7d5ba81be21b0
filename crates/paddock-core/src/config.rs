//! Configuration for the Paddock client
//!
//! Connection settings are read from `paddock.toml` when present, with
//! environment variables (`PADDOCK_SERVER`, `PADDOCK_USERNAME`,
//! `PADDOCK_PASSWORD`) taking precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Client connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Username for authentication
    #[serde(default)]
    pub username: String,

    /// Password for authentication
    #[serde(default)]
    pub password: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Load configuration from `paddock.toml` in the given directory, or use
    /// defaults, then apply environment variable overrides.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join("paddock.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| {
                crate::PaddockError::Config(format!("Failed to parse config file: {}", e))
            })?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Build configuration from environment variables alone
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(server) = std::env::var("PADDOCK_SERVER") {
            self.server_url = server;
        }
        if let Ok(username) = std::env::var("PADDOCK_USERNAME") {
            self.username = username;
        }
        if let Ok(password) = std::env::var("PADDOCK_PASSWORD") {
            self.password = password;
        }
        if let Ok(timeout) = std::env::var("PADDOCK_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring non-numeric PADDOCK_TIMEOUT_SECS"),
            }
        }
    }

    /// Write default configuration to `paddock.toml` in the given directory
    pub fn write_default(dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let config_path = dir.join("paddock.toml");
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            crate::PaddockError::Config(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
