use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};

use crate::validate::validate_api_key;

pub const DEFAULT_WEATHERAPI_BASE: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_IP_API_BASE: &str = "http://ip-api.com/json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// WeatherAPI.com settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: DEFAULT_WEATHERAPI_BASE.to_string() }
    }
}

/// ip-api.com settings. The service needs no key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub base_url: String,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_IP_API_BASE.to_string() }
    }
}

/// Top-level configuration stored on disk and overlaid with environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Example TOML:
    /// [weatherapi]
    /// api_key = "..."
    pub weatherapi: WeatherApiConfig,
    pub geolocation: GeolocationConfig,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weatherapi: WeatherApiConfig::default(),
            geolocation: GeolocationConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("weather-mcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn resolve() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env_with(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-mcp", "weather-mcp")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the environment. `lookup` stands in for `std::env::var`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("WEATHERAPI_KEY").filter(|k| !k.trim().is_empty()) {
            self.weatherapi.api_key = Some(key);
        }
        if let Some(url) = lookup("WEATHERAPI_BASE_URL") {
            self.weatherapi.base_url = url;
        }
        if let Some(url) = lookup("IP_API_BASE_URL") {
            self.geolocation.base_url = url;
        }
        if let Some(raw) = lookup("WEATHER_MCP_TIMEOUT_SECS") {
            self.timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("WEATHER_MCP_TIMEOUT_SECS must be a whole number, got '{raw}'"))?;
        }
        Ok(())
    }

    /// Replace the stored WeatherAPI key.
    pub fn set_api_key(&mut self, api_key: String) {
        self.weatherapi.api_key = Some(api_key);
    }

    /// Returns the WeatherAPI key, failing closed when it is absent or blank.
    pub fn require_api_key(&self) -> crate::Result<&str> {
        validate_api_key(self.weatherapi.api_key.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
