//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tubelens/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tubelens/` (~/.config/tubelens/)
//! - Data: `$XDG_DATA_HOME/tubelens/` (~/.local/share/tubelens/)
//! - State/Logs: `$XDG_STATE_HOME/tubelens/` (~/.local/state/tubelens/)
//!
//! The analytics functions themselves take no configuration. Values here feed
//! the collaborators around them: the store, the importer and report assembly.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `channel.api_key` is not set.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Channel / data API settings
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Report defaults
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Channel and data API configuration
///
/// Consumed by whatever fetches records from the platform API. Fetching
/// itself lives outside this crate.
#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    /// Enable API-backed collection
    #[serde(default)]
    pub enabled: bool,

    /// Channel to analyze
    pub channel_id: Option<String>,

    /// API key (falls back to `YOUTUBE_API_KEY`)
    pub api_key: Option<String>,

    /// Upper bound on videos pulled per refresh
    #[serde(default = "default_max_videos")]
    pub max_videos: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel_id: None,
            api_key: None,
            max_videos: default_max_videos(),
        }
    }
}

impl ChannelConfig {
    /// API key from config, else from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Check if collection is enabled and fully configured
    pub fn is_ready(&self) -> bool {
        self.enabled && self.channel_id.is_some() && self.resolved_api_key().is_some()
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.channel_id.is_none() {
            return Err(Error::Config(
                "channel.channel_id is required when channel collection is enabled".to_string(),
            ));
        }
        if self.resolved_api_key().is_none() {
            return Err(Error::Config(format!(
                "channel.api_key (or {}) is required when channel collection is enabled",
                API_KEY_ENV
            )));
        }
        if self.max_videos == 0 || self.max_videos > 500 {
            return Err(Error::Config(
                "channel.max_videos must be between 1 and 500".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_max_videos() -> usize {
    150
}

/// Defaults for report generation
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// Forecast horizon in days
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,

    /// Weeks covered by the posting calendar
    #[serde(default = "default_calendar_weeks")]
    pub calendar_weeks: u32,

    /// Uploads planned per week
    #[serde(default = "default_videos_per_week")]
    pub videos_per_week: u32,

    /// Display label for publish times (e.g. "US/Eastern")
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Below this many videos, reports flag results as statistically weak
    #[serde(default = "default_min_reliable_records")]
    pub min_reliable_records: usize,

    /// Length of top/worst video lists
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            forecast_days: default_forecast_days(),
            calendar_weeks: default_calendar_weeks(),
            videos_per_week: default_videos_per_week(),
            timezone: default_timezone(),
            min_reliable_records: default_min_reliable_records(),
            top_n: default_top_n(),
        }
    }
}

fn default_forecast_days() -> u32 {
    30
}

fn default_calendar_weeks() -> u32 {
    4
}

fn default_videos_per_week() -> u32 {
    3
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_min_reliable_records() -> usize {
    5
}

fn default_top_n() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.channel.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tubelens/config.toml` (~/.config/tubelens/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tubelens").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/tubelens/` (~/.local/share/tubelens/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("tubelens")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/tubelens/` (~/.local/state/tubelens/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tubelens")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/tubelens/tubelens.db`
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("tubelens.db")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.channel.enabled);
        assert_eq!(config.channel.max_videos, 150);
        assert_eq!(config.analytics.forecast_days, 30);
        assert_eq!(config.analytics.videos_per_week, 3);
        assert_eq!(config.analytics.timezone, "UTC");
        assert_eq!(config.analytics.min_reliable_records, 5);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analytics]
forecast_days = 14
calendar_weeks = 2
timezone = "US/Eastern"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.analytics.forecast_days, 14);
        assert_eq!(config.analytics.calendar_weeks, 2);
        assert_eq!(config.analytics.videos_per_week, 3);
        assert_eq!(config.analytics.timezone, "US/Eastern");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_channel_config_validation() {
        // Disabled config is always valid
        let config = ChannelConfig::default();
        assert!(config.validate().is_ok());

        let config = ChannelConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ChannelConfig {
            enabled: true,
            channel_id: Some("UC_test".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.is_ready());

        let config = ChannelConfig {
            enabled: true,
            channel_id: Some("UC_test".to_string()),
            api_key: Some("key".to_string()),
            max_videos: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[channel]
channel_id = "UC_abc"
max_videos = 50
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.channel.channel_id.as_deref(), Some("UC_abc"));
        assert_eq!(config.channel.max_videos, 50);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analytics\nforecast_days = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
