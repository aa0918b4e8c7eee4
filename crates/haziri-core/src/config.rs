//! Console configuration management.
//!
//! This module handles loading and saving the console configuration: the
//! backend base URL, the client-type identifier sent on every request, the
//! token refresh threshold, the transport timeout and the session storage
//! backend.
//!
//! Configuration is stored at `~/.config/haziri-admin/config.json`. Values from
//! the environment (`HAZIRI_*`, optionally loaded from a `.env` file by the
//! binary) override the file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_REFRESH_THRESHOLD_MINUTES;

/// Application name used for config/data/cache directory paths
pub const APP_NAME: &str = "haziri-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Production backend base URL, including the `/api` prefix.
pub const DEFAULT_API_URL: &str = "https://isgpp-gis-api.trakomatic.in/api";

/// Client identifier sent in `X-App-Type`.
pub const DEFAULT_APP_TYPE: &str = "Haziri-Admin";

/// HTTP request timeout in seconds. Applies to the refresh call too.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "HAZIRI_API_URL";
pub const ENV_APP_TYPE: &str = "HAZIRI_APP_TYPE";
pub const ENV_REFRESH_THRESHOLD: &str = "HAZIRI_REFRESH_THRESHOLD_MINUTES";
pub const ENV_REQUEST_TIMEOUT: &str = "HAZIRI_REQUEST_TIMEOUT_SECS";
pub const ENV_STORAGE: &str = "HAZIRI_STORAGE";

/// Where the four session entries are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per entry under the data directory
    #[default]
    File,
    /// OS keychain (macOS Keychain, Windows Credential Manager, Secret Service)
    Keyring,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            other => Err(anyhow::anyhow!(
                "Unknown storage backend '{}' (expected 'file' or 'keyring')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub app_type: String,
    pub token_refresh_threshold_minutes: i64,
    pub request_timeout_secs: u64,
    pub storage: StorageBackend,
    pub last_phone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_type: DEFAULT_APP_TYPE.to_string(),
            token_refresh_threshold_minutes: DEFAULT_REFRESH_THRESHOLD_MINUTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage: StorageBackend::default(),
            last_phone: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from an explicit path, falling back to defaults when it is absent.
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

    /// Record the phone number of the last sign-in. Only the file contents
    /// are rewritten; environment overrides are never persisted.
    pub fn remember_phone(&mut self, phone: &str) -> Result<()> {
        self.last_phone = Some(phone.to_string());
        let path = Self::config_path()?;
        let mut stored = Self::load_from(&path)?;
        stored.last_phone = self.last_phone.clone();
        stored.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `HAZIRI_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(app_type) = lookup(ENV_APP_TYPE) {
            self.app_type = app_type;
        }
        if let Some(minutes) = lookup(ENV_REFRESH_THRESHOLD) {
            self.token_refresh_threshold_minutes = minutes
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of minutes", ENV_REFRESH_THRESHOLD))?;
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_REQUEST_TIMEOUT))?;
        }
        if let Some(storage) = lookup(ENV_STORAGE) {
            self.storage = storage.parse()?;
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn refresh_threshold(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_refresh_threshold_minutes)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the file-backed session entries.
    pub fn session_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("session"))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join("logs"))
    }
}
