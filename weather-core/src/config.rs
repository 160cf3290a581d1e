use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::TemperatureUnit;

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_REMINDER_HOUR: u32 = 8;
pub const DEFAULT_REMINDER_MINUTE: u32 = 0;

/// Notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Master switch; nothing is scheduled while off.
    pub enabled: bool,
    pub daily_forecast: bool,
    pub weather_alerts: bool,
    pub reminder_hour: u32,
    pub reminder_minute: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            daily_forecast: false,
            weather_alerts: false,
            reminder_hour: DEFAULT_REMINDER_HOUR,
            reminder_minute: DEFAULT_REMINDER_MINUTE,
        }
    }
}

impl NotificationSettings {
    pub fn alerts_active(&self) -> bool {
        self.enabled && self.weather_alerts
    }

    pub fn daily_forecast_active(&self) -> bool {
        self.enabled && self.daily_forecast
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "celsius"
///
/// [notifications]
/// enabled = true
/// weather_alerts = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the OpenWeather base URL, e.g. a local proxy.
    pub base_url: Option<String>,

    #[serde(default)]
    pub units: TemperatureUnit,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(skip)]
    env_api_key: Option<String>,
}

impl Config {
    /// Load config from the platform path and apply the environment override.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = Self::load_from(&path)?;
        Ok(cfg.with_env_key(std::env::var(API_KEY_ENV).ok()))
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform path.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "kiwi", "kiwi-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Attach a key taken from the environment; it wins over the file's key.
    pub fn with_env_key(mut self, key: Option<String>) -> Self {
        self.env_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// API key in effect, if any. Blank keys count as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.env_api_key
            .as_deref()
            .or(self.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_key() {
        let cfg = Config::default();
        assert!(cfg.api_key().is_none());
        assert!(!cfg.is_configured());
        assert_eq!(cfg.units, TemperatureUnit::Celsius);
        assert_eq!(cfg.notifications.reminder_hour, 8);
        assert_eq!(cfg.notifications.reminder_minute, 0);
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));

        let cfg = cfg.with_env_key(Some("ENV_KEY".into()));
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_keys_are_ignored() {
        let mut cfg = Config::default().with_env_key(Some("  ".into()));
        assert!(cfg.api_key().is_none());

        cfg.set_api_key(String::new());
        assert!(!cfg.is_configured());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".into());
        cfg.units = TemperatureUnit::Fahrenheit;
        cfg.notifications.enabled = true;
        cfg.notifications.weather_alerts = true;
        cfg.notifications.reminder_hour = 7;
        cfg.notifications.reminder_minute = 30;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key(), Some("OPEN_KEY"));
        assert_eq!(loaded.units, TemperatureUnit::Fahrenheit);
        assert_eq!(loaded.notifications, cfg.notifications);
        assert!(loaded.notifications.alerts_active());
        assert!(!loaded.notifications.daily_forecast_active());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"K\"\n[notifications]\nenabled = true\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.api_key(), Some("K"));
        assert!(cfg.notifications.enabled);
        assert_eq!(cfg.notifications.reminder_hour, 8);
        assert_eq!(cfg.units, TemperatureUnit::Celsius);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
