//! Application configuration management.
//!
//! Configuration is stored at `~/.config/kwoon/config.json` and holds the
//! server address, the last email used to log in, and whether to start in
//! offline mode. `KWOON_API_URL` and `KWOON_EMAIL` override the file for
//! the current run only; they are never written back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "kwoon";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

pub const ENV_API_URL: &str = "KWOON_API_URL";
pub const ENV_EMAIL: &str = "KWOON_EMAIL";
pub const ENV_PASSWORD: &str = "KWOON_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub last_email: Option<String>,
    #[serde(default)]
    pub offline_mode: bool,
    #[serde(skip)]
    overrides: Overrides,
}

/// Values taken from the environment for this run.
#[derive(Debug, Clone, Default)]
struct Overrides {
    api_base_url: Option<String>,
    last_email: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            last_email: None,
            offline_mode: false,
            overrides: Overrides::default(),
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
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

    /// Apply overrides from a variable lookup (the process environment in
    /// production). Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        self.overrides.api_base_url = non_blank(ENV_API_URL);
        self.overrides.last_email = non_blank(ENV_EMAIL);
    }

    /// Server root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.overrides
            .api_base_url
            .as_deref()
            .unwrap_or(&self.api_base_url)
            .trim_end_matches('/')
    }

    /// Email to prefill at login.
    pub fn email(&self) -> Option<&str> {
        self.overrides
            .last_email
            .as_deref()
            .or(self.last_email.as_deref())
    }

    /// Remember a successful login. Replaces any environment override.
    pub fn remember_email(&mut self, email: String) {
        self.overrides.last_email = None;
        self.last_email = Some(email);
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
