//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.resumetrics.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Refresh settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store's REST endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Key pattern listed on every refresh.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            pattern: default_pattern(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:4100".to_string()
}

fn default_pattern() -> String {
    "resume:*".to_string()
}

fn default_timeout() -> u64 {
    crate::store::http::DEFAULT_TIMEOUT_SECS
}

/// Refresh settings for watch mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Seconds between refresh cycles.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    crate::analytics::worker::DEFAULT_REFRESH_SECS
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format: "markdown" or "json".
    #[serde(default = "default_format")]
    pub format: String,

    /// Output file path; empty means stdout.
    #[serde(default)]
    pub output: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output: String::new(),
        }
    }
}

fn default_format() -> String {
    "markdown".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".resumetrics.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.store_url {
            self.store.base_url = url.clone();
        }

        // Pattern always comes from the CLI (it has a default there).
        self.store.pattern = args.pattern.clone();

        if let Some(timeout) = args.timeout {
            self.store.timeout_seconds = timeout;
        }

        if let Some(interval) = args.interval {
            self.analytics.refresh_interval_seconds = interval;
        }

        if let Some(ref output) = args.output {
            self.report.output = output.display().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.pattern, "resume:*");
        assert_eq!(config.analytics.refresh_interval_seconds, 9000);
        assert_eq!(config.report.format, "markdown");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[store]
base_url = "http://kv.internal:9000"
pattern = "resume:team-a:*"

[analytics]
refresh_interval_seconds = 600

[report]
format = "json"
output = "stats.json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.store.base_url, "http://kv.internal:9000");
        assert_eq!(config.store.pattern, "resume:team-a:*");
        assert_eq!(config.analytics.refresh_interval_seconds, 600);
        assert_eq!(config.report.format, "json");
        assert_eq!(config.report.output, "stats.json");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[store]\nbase_url = \"http://x:1\"\n").unwrap();
        assert_eq!(config.store.pattern, "resume:*");
        assert_eq!(config.analytics.refresh_interval_seconds, 9000);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[analytics]"));
        assert!(toml_str.contains("[report]"));
    }
}
