//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chart::{RenderSettings, Rgb, SET3};
use crate::interaction::InteractionSettings;
use crate::store::ExpenseFields;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Expenses loaded into the in-memory collection at startup
    #[serde(default)]
    pub seed: Vec<ExpenseFields>,
}

/// Chart geometry, timing and palette
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_dimension")]
    pub width: f64,

    #[serde(default = "default_dimension")]
    pub height: f64,

    #[serde(default = "default_radius")]
    pub radius: f64,

    #[serde(default = "default_inner_radius")]
    pub inner_radius: f64,

    /// Extra canvas space around the chart, holds the legend
    #[serde(default = "default_margin")]
    pub margin: f64,

    /// Horizontal gap between chart area and legend
    #[serde(default = "default_legend_offset")]
    pub legend_offset: f64,

    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,

    #[serde(default = "default_hover_ms")]
    pub hover_ms: u64,

    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    #[serde(default = "default_white")]
    pub highlight_color: Rgb,

    #[serde(default = "default_white")]
    pub stroke_color: Rgb,

    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    #[serde(default = "default_white")]
    pub legend_text_color: Rgb,

    #[serde(default = "default_legend_shape_radius")]
    pub legend_shape_radius: f64,

    #[serde(default = "default_legend_shape_padding")]
    pub legend_shape_padding: f64,

    #[serde(default = "default_scheme")]
    pub scheme: Vec<Rgb>,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_dimension() -> f64 {
    300.0
}

fn default_radius() -> f64 {
    150.0
}

fn default_inner_radius() -> f64 {
    75.0
}

fn default_margin() -> f64 {
    150.0
}

fn default_legend_offset() -> f64 {
    40.0
}

fn default_transition_ms() -> u64 {
    750
}

fn default_hover_ms() -> u64 {
    300
}

fn default_frame_interval_ms() -> u64 {
    16 // ~60 fps
}

fn default_white() -> Rgb {
    Rgb::WHITE
}

fn default_stroke_width() -> f64 {
    3.0
}

fn default_legend_shape_radius() -> f64 {
    10.0
}

fn default_legend_shape_padding() -> f64 {
    10.0
}

fn default_scheme() -> Vec<Rgb> {
    SET3.iter().filter_map(|hex| hex.parse().ok()).collect()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_dimension(),
            height: default_dimension(),
            radius: default_radius(),
            inner_radius: default_inner_radius(),
            margin: default_margin(),
            legend_offset: default_legend_offset(),
            transition_ms: default_transition_ms(),
            hover_ms: default_hover_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            highlight_color: default_white(),
            stroke_color: default_white(),
            stroke_width: default_stroke_width(),
            legend_text_color: default_white(),
            legend_shape_radius: default_legend_shape_radius(),
            legend_shape_padding: default_legend_shape_padding(),
            scheme: default_scheme(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl ChartConfig {
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            transition: Duration::from_millis(self.transition_ms),
            outer_radius: self.radius,
            inner_radius: self.inner_radius,
            scheme: self.scheme.clone(),
        }
    }

    pub fn interaction_settings(&self) -> InteractionSettings {
        InteractionSettings {
            highlight: self.highlight_color,
            hover_duration: Duration::from_millis(self.hover_ms),
            currency_symbol: self.currency_symbol.clone(),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum concurrent WebSocket viewers
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_max_connections() -> usize {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("expense-pie").join("config.toml")),
            Some(PathBuf::from("/etc/expense-pie/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("EXPENSE_PIE_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("EXPENSE_PIE_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        if let Some(ms) = var("EXPENSE_PIE_TRANSITION_MS").and_then(|v| v.parse().ok()) {
            self.chart.transition_ms = ms;
        }

        if let Some(level) = var("EXPENSE_PIE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("EXPENSE_PIE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r##"# Expense Pie Configuration
#
# Environment variables override these settings:
# - EXPENSE_PIE_HOST
# - EXPENSE_PIE_PORT
# - EXPENSE_PIE_TRANSITION_MS
# - EXPENSE_PIE_LOG_LEVEL
# - EXPENSE_PIE_LOG_FORMAT

[chart]
# Chart area size in pixels
width = 300
height = 300

# Donut radii
radius = 150
inner_radius = 75

# Extra canvas space for the legend
margin = 150
legend_offset = 40

# Slice enter/update/exit duration (ms)
transition_ms = 750

# Hover highlight fade duration (ms)
hover_ms = 300

# Frame push interval while animating (ms)
frame_interval_ms = 16

highlight_color = "#ffffff"
stroke_color = "#ffffff"
stroke_width = 3
legend_text_color = "#ffffff"
legend_shape_radius = 10
legend_shape_padding = 10

# Category colors, assigned in order of first appearance
scheme = ["#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462",
          "#b3de69", "#fccde5", "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f"]

currency_symbol = "$"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Maximum concurrent WebSocket viewers
max_connections = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Initial expenses for the in-memory collection
# [[seed]]
# name = "Coffee"
# cost = 5
"##
    .to_string()
}
