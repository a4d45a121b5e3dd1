//! # Client Configuration
//!
//! Configuration for the HTTP layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CARMAN_API_URL=http://10.0.0.5:4000                                │
//! │     CARMAN_TIMEOUT_SECS=15                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/carman/client.toml (Linux)                               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! base_url = "http://149.50.128.181:4000"
//! timeout_secs = 10
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Production API host baked in as the default, same as the mobile builds.
pub const DEFAULT_BASE_URL: &str = "http://149.50.128.181:4000";

/// Fixed request timeout. There is no retry policy anywhere in this layer;
/// a timed-out request surfaces as a failure for the caller to retry.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`crate::api::ApiClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the Carman REST API, without a trailing slash.
    pub base_url: String,

    /// Fixed per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Loads configuration: file (explicit path or platform default), then
    /// environment overrides, then defaults. Never fails — a broken file is
    /// logged and skipped.
    pub fn load_or_default(path: Option<PathBuf>) -> Self {
        let path = path.or_else(default_config_path);
        let mut config = match path {
            Some(ref p) => match std::fs::read_to_string(p) {
                Ok(raw) => match Self::from_toml_str(&raw) {
                    Ok(config) => {
                        debug!(path = %p.display(), "Loaded client config");
                        config
                    }
                    Err(err) => {
                        warn!(path = %p.display(), %err, "Ignoring unparseable config file");
                        ClientConfig::default()
                    }
                },
                Err(_) => ClientConfig::default(),
            },
            None => ClientConfig::default(),
        };
        config.apply_env();
        config
    }

    /// Parses a TOML document into a config.
    pub fn from_toml_str(raw: &str) -> ClientResult<Self> {
        toml::from_str(raw).map_err(|err| ClientError::InvalidConfig(err.to_string()))
    }

    /// Applies `CARMAN_API_URL` / `CARMAN_TIMEOUT_SECS` overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CARMAN_API_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(secs) = std::env::var("CARMAN_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(parsed) if parsed > 0 => self.timeout_secs = parsed,
                _ => warn!(value = %secs, "Ignoring invalid CARMAN_TIMEOUT_SECS"),
            }
        }
    }

    /// Validates the config, normalizing the base URL (no trailing slash).
    pub fn validated(mut self) -> ClientResult<Self> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| ClientError::InvalidConfig(format!("base_url: {}", err)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "base_url: unsupported scheme '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be positive".to_string(),
            ));
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        Ok(self)
    }
}

/// Platform default: `<config dir>/carman/client.toml`.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "carman", "carman").map(|dirs| dirs.config_dir().join("client.toml"))
}
