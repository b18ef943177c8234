//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::analytics::{SalesAggregator, DEFAULT_RECENT_LIMIT, DEFAULT_TOP_ITEMS};
use crate::filter::TimeWindow;
use crate::source::{FileSource, HttpSource, HttpSourceConfig, SalesSource, SourceResult};
use crate::view::{SalesView, SummaryMode, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub view: ViewConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which kind of source feeds the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Http,
    File,
}

/// Data source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Sales snapshot (JSON or CSV), used when `kind = "file"`
    #[serde(default)]
    pub sales_file: Option<PathBuf>,

    /// Inventory snapshot, optional
    #[serde(default)]
    pub items_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            sales_file: None,
            items_file: None,
        }
    }
}

impl SourceConfig {
    /// Build the configured source
    pub fn build(&self) -> Result<Box<dyn SalesSource>, ConfigError> {
        match self.kind {
            SourceKind::Http => {
                let source = self.http_source().map_err(|e| ConfigError::Invalid {
                    field: "source.base_url",
                    error: e.to_string(),
                })?;
                Ok(Box::new(source))
            }
            SourceKind::File => {
                let path = self.sales_file.clone().ok_or(ConfigError::Invalid {
                    field: "source.sales_file",
                    error: "required when source.kind = \"file\"".to_string(),
                })?;
                let mut source = FileSource::new(path);
                if let Some(items) = &self.items_file {
                    source = source.with_items(items);
                }
                Ok(Box::new(source))
            }
        }
    }

    fn http_source(&self) -> SourceResult<HttpSource> {
        HttpSource::new(HttpSourceConfig {
            base_url: self.base_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
        })
    }
}

/// Dashboard view configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub default_window: TimeWindow,

    #[serde(default)]
    pub summary_mode: SummaryMode,

    #[serde(default = "default_top_items")]
    pub top_items: usize,

    #[serde(default = "default_recent_sales")]
    pub recent_sales: usize,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_top_items() -> usize {
    DEFAULT_TOP_ITEMS
}

fn default_recent_sales() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_window: TimeWindow::default(),
            summary_mode: SummaryMode::default(),
            top_items: default_top_items(),
            recent_sales: default_recent_sales(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl ViewConfig {
    /// Build the view these settings describe
    pub fn build(&self) -> SalesView {
        SalesView::new()
            .with_page_size(self.page_size)
            .with_summary_mode(self.summary_mode)
            .with_top_items(self.top_items)
            .with_aggregator(SalesAggregator::new().with_recent_limit(self.recent_sales))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
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
            file: None,
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

    /// Parse configuration text
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
            dirs::config_dir().map(|p| p.join("laku").join("config.toml")),
            Some(PathBuf::from("/etc/laku/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Source overrides
        if let Some(url) = lookup("LAKU_API_URL") {
            self.source.kind = SourceKind::Http;
            self.source.base_url = url;
        }
        if let Some(path) = lookup("LAKU_SALES_FILE") {
            self.source.kind = SourceKind::File;
            self.source.sales_file = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("LAKU_ITEMS_FILE") {
            self.source.items_file = Some(PathBuf::from(path));
        }

        // View overrides
        if let Some(mode) = lookup("LAKU_SUMMARY_MODE") {
            match mode.parse() {
                Ok(mode) => self.view.summary_mode = mode,
                Err(e) => tracing::warn!("Ignoring LAKU_SUMMARY_MODE: {}", e),
            }
        }
        if let Some(size) = lookup("LAKU_PAGE_SIZE") {
            if let Ok(size) = size.trim().parse() {
                self.view.page_size = size;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("LAKU_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LAKU_LOG_FORMAT") {
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

    #[error("Invalid {field}: {error}")]
    Invalid { field: &'static str, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Laku Configuration
#
# Environment variables override these settings:
# - LAKU_API_URL
# - LAKU_SALES_FILE
# - LAKU_ITEMS_FILE
# - LAKU_SUMMARY_MODE
# - LAKU_PAGE_SIZE
# - LAKU_LOG_LEVEL
# - LAKU_LOG_FORMAT

[source]
# Where sales come from: http (the sales backend) or file (a JSON/CSV export)
kind = "http"

# Sales backend URL
base_url = "http://localhost:5000"

# Request timeout in seconds
request_timeout_secs = 10

# Sales snapshot for kind = "file"
# sales_file = "./sales.json"

# Optional inventory snapshot
# items_file = "./items.json"

[view]
# Rows in the sales table
page_size = 10

# Initial time window: all, today, week, month, year
default_window = "all"

# Where the summary cards come from:
#   server   - the backend's summary over every sale
#   snapshot - computed from the whole sales snapshot
#   filtered - computed from the sales matching window and search
summary_mode = "server"

# Items in the units sold chart
top_items = 5

# Entries in the recent sales list
recent_sales = 5

# Refresh interval for `laku watch` (seconds)
refresh_interval_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/laku/laku.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.base_url, "http://localhost:5000");
        assert_eq!(config.view.page_size, 10);
        assert_eq!(config.view.default_window, TimeWindow::All);
        assert_eq!(config.view.summary_mode, SummaryMode::Server);
        assert_eq!(config.view.refresh_interval_secs, 30);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [source]
            kind = "file"
            sales_file = "sales.csv"

            [view]
            summary_mode = "filtered"
            default_window = "week"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.source.sales_file, Some(PathBuf::from("sales.csv")));
        assert_eq!(config.source.request_timeout_secs, 10);
        assert_eq!(config.view.summary_mode, SummaryMode::Filtered);
        assert_eq!(config.view.default_window, TimeWindow::Week);
        assert_eq!(config.view.top_items, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::parse("[view]\nsummary_mode = \"sideways\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[view]\npage_size = 25\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.view.page_size, 25);

        let missing = Config::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("LAKU_SALES_FILE", "/tmp/sales.json"),
            ("LAKU_SUMMARY_MODE", "snapshot"),
            ("LAKU_PAGE_SIZE", "20"),
            ("LAKU_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.source.sales_file, Some(PathBuf::from("/tmp/sales.json")));
        assert_eq!(config.view.summary_mode, SummaryMode::Snapshot);
        assert_eq!(config.view.page_size, 20);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_bad_overrides_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "LAKU_SUMMARY_MODE" => Some("sideways".to_string()),
            "LAKU_PAGE_SIZE" => Some("ten".to_string()),
            _ => None,
        });

        assert_eq!(config.view.summary_mode, SummaryMode::Server);
        assert_eq!(config.view.page_size, 10);
    }

    #[test]
    fn test_build_source() {
        let config = Config::default();
        assert_eq!(config.source.build().unwrap().name(), "http");

        let mut file = SourceConfig {
            kind: SourceKind::File,
            ..SourceConfig::default()
        };
        assert!(matches!(
            file.build(),
            Err(ConfigError::Invalid { field: "source.sales_file", .. })
        ));

        file.sales_file = Some(PathBuf::from("sales.json"));
        assert_eq!(file.build().unwrap().name(), "file");
    }

    #[test]
    fn test_build_view() {
        let view = ViewConfig {
            page_size: 3,
            summary_mode: SummaryMode::Snapshot,
            ..ViewConfig::default()
        }
        .build();

        assert_eq!(view.page_size(), 3);
        assert_eq!(view.summary_mode(), SummaryMode::Snapshot);
    }
}
