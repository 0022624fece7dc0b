//! Configuration file handling with TOML support.

use crate::models::{DetailMode, ResultsLayout};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Color scheme
    #[serde(default)]
    pub colors: ColorConfig,
}

/// Where the recommendation backend lives and how to call it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// POST endpoint taking `{"query": ...}`
    #[serde(default = "default_recommend_path")]
    pub recommend_path: String,

    /// Profile endpoint, `{symbol}` is replaced with the ticker
    #[serde(default = "default_details_path")]
    pub details_path: String,

    /// Dashboard endpoint, `{symbol}` is replaced with the ticker
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            recommend_path: default_recommend_path(),
            details_path: default_details_path(),
            dashboard_path: default_dashboard_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_recommend_path() -> String {
    "/api/get_stock_recommendation".to_string()
}
fn default_details_path() -> String {
    "/api/get_stock_details/{symbol}".to_string()
}
fn default_dashboard_path() -> String {
    "/api/get_stock_dashboard/{symbol}".to_string()
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Simple profile modal or the extended dashboard
    #[serde(default)]
    pub detail_mode: DetailMode,

    /// Cards with a modal detail, or a table with inline detail
    #[serde(default)]
    pub results_layout: ResultsLayout,

    /// Live price update interval, e.g. "1500ms" or "2s"
    #[serde(default = "default_live_tick")]
    pub live_tick: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            detail_mode: DetailMode::default(),
            results_layout: ResultsLayout::default(),
            live_tick: default_live_tick(),
        }
    }
}

fn default_live_tick() -> String {
    "1500ms".to_string()
}

impl DisplayConfig {
    /// Parsed live tick interval.
    pub fn live_tick_interval(&self) -> Result<Duration> {
        let interval = humantime::parse_duration(self.live_tick.trim())
            .with_context(|| format!("Invalid live_tick duration: {}", self.live_tick))?;
        if interval.is_zero() {
            anyhow::bail!("live_tick must be greater than zero");
        }
        Ok(interval)
    }
}

/// Color configuration using hex codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Color for positive changes and bullish signals
    #[serde(default = "default_gain_color")]
    pub gain: String,

    /// Color for negative changes and bearish signals
    #[serde(default = "default_loss_color")]
    pub loss: String,

    /// Color for user messages
    #[serde(default = "default_user_color")]
    pub user: String,

    /// Color for bot messages
    #[serde(default = "default_bot_color")]
    pub bot: String,

    /// Border color
    #[serde(default = "default_border_color")]
    pub border: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            gain: default_gain_color(),
            loss: default_loss_color(),
            user: default_user_color(),
            bot: default_bot_color(),
            border: default_border_color(),
        }
    }
}

fn default_gain_color() -> String {
    "#00ff00".to_string()
}
fn default_loss_color() -> String {
    "#ff0000".to_string()
}
fn default_user_color() -> String {
    "#1e90ff".to_string()
}
fn default_bot_color() -> String {
    "#ffffff".to_string()
}
fn default_border_color() -> String {
    "#444444".to_string()
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from default location or create default.
    pub fn load_or_default() -> Self {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!(error = %e, "failed to load config, using defaults");
                        eprintln!("Warning: Failed to load config: {:#}", e);
                    }
                }
            }
        }
        Config::default()
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("geniusmind").join("config.toml"))
    }

    /// Default location of the interactive-mode log file.
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("geniusmind").join("geniusmind.log"))
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
