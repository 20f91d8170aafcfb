//! Application configuration management.
//!
//! Configuration is stored at `~/.config/ogdrb/config.json` and holds the
//! RepeaterBook identity (app name, contact e-mail, optional token), network
//! timeouts and the location of the local repeater store. Every field has a
//! default, so a missing file is not an error. `OGDRB_APP_EMAIL` and
//! `OGDRB_API_TOKEN` override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "ogdrb";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Repeater store file name inside the cache directory
const STORE_FILE: &str = "repeaters.json";

const ENV_APP_EMAIL: &str = "OGDRB_APP_EMAIL";
const ENV_API_TOKEN: &str = "OGDRB_API_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sent in the User-Agent, as RepeaterBook asks API users to identify themselves.
    pub app_name: String,
    pub app_email: Option<String>,
    pub api_token: Option<String>,
    /// Per HTTP request.
    pub request_timeout_secs: u64,
    /// Per split download, covering all of its requests and retries.
    pub download_timeout_secs: u64,
    pub max_concurrent_downloads: usize,
    /// Overrides the default `~/.cache/ogdrb/repeaters.json`.
    pub store_path: Option<PathBuf>,
    pub log_to_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            app_email: None,
            api_token: None,
            request_timeout_secs: 30,
            download_timeout_secs: 120,
            max_concurrent_downloads: 4,
            store_path: None,
            log_to_file: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(email) = lookup(ENV_APP_EMAIL).filter(|v| !v.is_empty()) {
            self.app_email = Some(email);
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.is_empty()) {
            self.api_token = Some(token);
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        match self.store_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(self.cache_dir()?.join(STORE_FILE)),
        }
    }

    pub fn user_agent(&self) -> String {
        match self.app_email {
            Some(ref email) => format!("{}, {}", self.app_name, email),
            None => self.app_name.clone(),
        }
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
