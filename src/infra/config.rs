//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use crate::services::distance::DistanceMetric;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/dev.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Upper bound for a single store round trip (0 disables the bound)
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path(), query_timeout_ms: default_query_timeout_ms() }
    }
}

fn default_store_path() -> String {
    "data/journeys.db".to_string()
}

fn default_query_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatsConfig {
    #[serde(default)]
    pub metric: DistanceMetric,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    store_path: String,
    query_timeout_ms: u64,
    metric: DistanceMetric,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            query_timeout_ms: default_query_timeout_ms(),
            metric: DistanceMetric::Planar,
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Determine config file path from the CLI flag or environment
    pub fn resolve_config_path(cli_path: Option<&str>) -> String {
        if let Some(path) = cli_path {
            return path.to_string();
        }

        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        DEFAULT_CONFIG_PATH.to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml_str(&content, &path.display().to_string())
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn from_toml_str(content: &str, config_file: &str) -> anyhow::Result<Self> {
        let toml_config: TomlConfig = toml::from_str(content)?;

        Ok(Self {
            store_path: toml_config.store.path,
            query_timeout_ms: toml_config.store.query_timeout_ms,
            metric: toml_config.stats.metric,
            config_file: config_file.to_string(),
        })
    }

    /// Load configuration, falling back to defaults when the file is
    /// missing or invalid
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path, error = %format!("{e:#}"), "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    pub fn store_path(&self) -> &str {
        &self.store_path
    }

    pub fn query_timeout_ms(&self) -> u64 {
        self.query_timeout_ms
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method to override the store timeout
    pub fn with_query_timeout_ms(mut self, ms: u64) -> Self {
        self.query_timeout_ms = ms;
        self
    }

    /// Builder method to override the distance metric
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }
}
