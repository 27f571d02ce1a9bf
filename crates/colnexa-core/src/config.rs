//! Application configuration management.
//!
//! Configuration is stored at `~/.config/colnexa/config.json` and may be
//! overridden per process by environment variables:
//!
//! - `COLNEXA_API_URL`: backend base URL
//! - `COLNEXA_JWT_STORAGE_KEY`: storage key for the bearer token
//! - `COLNEXA_SESSION_TIMEOUT_MS`: session timeout in milliseconds
//!
//! Session storage lives at `~/.cache/colnexa/storage.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::DEFAULT_BASE_URL;
use crate::auth::state::{DEFAULT_DASHBOARD_ROUTE, DEFAULT_LOGIN_ROUTE};
use crate::auth::Routes;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "colnexa";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Session storage file name in cache directory
const STORAGE_FILE: &str = "storage.json";

/// Default storage key for the bearer token
pub const DEFAULT_JWT_STORAGE_KEY: &str = "jwt";

/// Default session timeout: one hour
pub const DEFAULT_SESSION_TIMEOUT_MS: u64 = 3_600_000;

pub const ENV_API_URL: &str = "COLNEXA_API_URL";
pub const ENV_JWT_STORAGE_KEY: &str = "COLNEXA_JWT_STORAGE_KEY";
pub const ENV_SESSION_TIMEOUT_MS: &str = "COLNEXA_SESSION_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub jwt_storage_key: String,
    /// Carried for front ends that want an idle timeout; expiry itself
    /// comes from the token.
    pub session_timeout_ms: u64,
    pub login_route: String,
    pub dashboard_route: String,
    pub last_identifier: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            jwt_storage_key: DEFAULT_JWT_STORAGE_KEY.to_string(),
            session_timeout_ms: DEFAULT_SESSION_TIMEOUT_MS,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            dashboard_route: DEFAULT_DASHBOARD_ROUTE.to_string(),
            last_identifier: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults if absent), then apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from `lookup` (the process environment in `load`).
    /// Empty values are ignored; an unparsable timeout keeps the old value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(key) = get(ENV_JWT_STORAGE_KEY) {
            self.jwt_storage_key = key;
        }
        if let Some(timeout) = get(ENV_SESSION_TIMEOUT_MS) {
            match timeout.trim().parse() {
                Ok(ms) => self.session_timeout_ms = ms,
                Err(_) => warn!(value = %timeout, "Ignoring invalid session timeout"),
            }
        }
    }

    pub fn routes(&self) -> Routes {
        Routes {
            login: self.login_route.clone(),
            dashboard: self.dashboard_route.clone(),
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Path of the file-backed session storage
    pub fn storage_path(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(STORAGE_FILE))
    }
}
