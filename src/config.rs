use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analytics::{AnalyticsOptions, WeekStart};

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Fallback rate when neither the entry nor its project sets one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hourly_rate: Option<f64>,
    #[serde(default)]
    pub week_starts_on: WeekStart,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_hourly_rate: None,
            week_starts_on: WeekStart::default(),
        }
    }
}

fn default_database_path() -> String {
    "~/.local/share/freelance-ledger/data.db".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_include_time_distribution")]
    pub include_time_distribution: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            include_time_distribution: default_include_time_distribution(),
        }
    }
}

fn default_format() -> String {
    "md".to_string()
}

fn default_include_time_distribution() -> bool {
    false
}

/// Flattened configuration used by commands
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub database_path: PathBuf,
    pub default_hourly_rate: Option<f64>,
    pub week_starts_on: WeekStart,
    pub default_format: String,
    pub include_time_distribution: bool,
}

impl EffectiveConfig {
    pub fn load() -> Result<Self> {
        Self::from_global(load_global_config()?)
    }

    pub fn from_global(global: GlobalConfig) -> Result<Self> {
        Ok(Self {
            database_path: expand_path(&global.settings.database_path)?,
            default_hourly_rate: global.settings.default_hourly_rate,
            week_starts_on: global.settings.week_starts_on,
            default_format: global.report.default_format,
            include_time_distribution: global.report.include_time_distribution,
        })
    }

    pub fn analytics_options(&self) -> AnalyticsOptions {
        AnalyticsOptions {
            default_hourly_rate: self.default_hourly_rate,
            week_starts_on: self.week_starts_on,
        }
    }
}

/// Get the global config directory path
pub fn global_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("freelance-ledger");
    Ok(config_dir)
}

/// Get the global config file path
pub fn global_config_path() -> Result<PathBuf> {
    Ok(global_config_dir()?.join("config.toml"))
}

/// Load global configuration from ~/.config/freelance-ledger/config.toml
pub fn load_global_config() -> Result<GlobalConfig> {
    let config_path = global_config_path()?;

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

pub fn parse_config(content: &str) -> Result<GlobalConfig> {
    Ok(toml::from_str(content)?)
}

/// Initialize global config directory and create default config if not exists
pub fn init_global_config() -> Result<PathBuf> {
    let config_dir = global_config_dir()?;
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");

    if !config_path.exists() {
        let default_config = GlobalConfig::default();
        let content = toml::to_string_pretty(&default_config)
            .context("Failed to serialize default config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
    }

    Ok(config_path)
}

/// Expand ~ and environment variables in path
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
