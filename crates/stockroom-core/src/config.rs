//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds the
//! API host, the origin the app is served from, and the last used username.
//!
//! Configuration is stored at `~/.config/stockroom/config.json`. The
//! `STOCKROOM_API_URL` and `STOCKROOM_ORIGIN` environment variables take
//! precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for the config directory path
const APP_NAME: &str = "stockroom";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Path prefix of every API endpoint
pub const API_PREFIX: &str = "/api/v1";

/// Origin used to resolve the relative API path when no host is configured
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:8000";

pub const API_URL_ENV: &str = "STOCKROOM_API_URL";
pub const ORIGIN_ENV: &str = "STOCKROOM_ORIGIN";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub app_origin: Option<String>,
    #[serde(default)]
    pub last_username: Option<String>,
}

impl Config {
    /// Load the config file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Override file settings with environment variables that are set
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            debug!(%url, "API URL from environment");
            self.api_url = Some(url);
        }
        if let Ok(origin) = std::env::var(ORIGIN_ENV) {
            debug!(%origin, "App origin from environment");
            self.app_origin = Some(origin);
        }
    }

    /// Base URL for API requests as the app sees it.
    ///
    /// With an API host configured this is `<host>/api/v1` (one trailing
    /// slash on the host is dropped); otherwise it is the relative proxy path
    /// `/api/v1`.
    pub fn api_base_url(&self) -> String {
        match self.api_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => {
                let host = url.strip_suffix('/').unwrap_or(url);
                format!("{}{}", host, API_PREFIX)
            }
            None => API_PREFIX.to_string(),
        }
    }

    /// Absolute base URL, resolving the proxy path against the app origin
    pub fn resolved_base_url(&self) -> String {
        let base = self.api_base_url();
        if base.starts_with('/') {
            let origin = self
                .app_origin
                .as_deref()
                .filter(|o| !o.is_empty())
                .unwrap_or(DEFAULT_APP_ORIGIN);
            format!("{}{}", origin.trim_end_matches('/'), base)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_api_url(url: &str) -> Config {
        Config {
            api_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_api_base_url_from_host() {
        assert_eq!(
            with_api_url("https://api.example.com").api_base_url(),
            "https://api.example.com/api/v1"
        );
        assert_eq!(
            with_api_url("https://api.example.com/").api_base_url(),
            "https://api.example.com/api/v1"
        );
    }

    #[test]
    fn test_api_base_url_strips_only_one_slash() {
        assert_eq!(
            with_api_url("https://api.example.com//").api_base_url(),
            "https://api.example.com//api/v1"
        );
    }

    #[test]
    fn test_api_base_url_falls_back_to_proxy_path() {
        assert_eq!(Config::default().api_base_url(), "/api/v1");
        assert_eq!(with_api_url("").api_base_url(), "/api/v1");
    }

    #[test]
    fn test_resolved_base_url() {
        assert_eq!(Config::default().resolved_base_url(), "http://localhost:8000/api/v1");

        let config = Config {
            app_origin: Some("https://stock.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolved_base_url(), "https://stock.example.com/api/v1");

        assert_eq!(
            with_api_url("https://api.example.com").resolved_base_url(),
            "https://api.example.com/api/v1"
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockroom").join("config.json");

        let config = Config {
            api_url: Some("https://api.example.com".to_string()),
            app_origin: None,
            last_username: Some("mkent".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url, config.api_url);
        assert_eq!(loaded.last_username.as_deref(), Some("mkent"));
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(loaded.api_url.is_none());
        assert!(loaded.last_username.is_none());
    }

    #[test]
    fn test_load_accepts_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"last_username": "ops"}"#).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_username.as_deref(), Some("ops"));
        assert!(loaded.app_origin.is_none());
    }
}
