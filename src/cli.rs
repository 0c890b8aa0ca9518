//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Resumetrics - analytics dashboard for resume-review records
///
/// Reads resume records from a key-value store, computes totals,
/// per-job counts, a 14-day upload window, and match statistics, and
/// renders them as Markdown or JSON. One-shot by default; --watch keeps
/// refreshing on an interval.
///
/// Examples:
///   resumetrics --store-url http://localhost:4100
///   resumetrics --store-url http://localhost:4100 --format json --output stats.json
///   resumetrics --local fixtures/records.json
///   resumetrics --store-url http://localhost:4100 --watch --interval 600
///   resumetrics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the record store's REST endpoint
    ///
    /// Not required when using --init-config or --local.
    #[arg(
        short,
        long,
        value_name = "URL",
        env = "RESUMETRICS_STORE_URL",
        required_unless_present_any = ["init_config", "local"]
    )]
    pub store_url: Option<String>,

    /// Key pattern to list from the store
    #[arg(short, long, default_value = "resume:*", value_name = "PATTERN")]
    pub pattern: String,

    /// Read records from a local JSON file instead of the store
    ///
    /// The file holds either an array of {key, value} entries or a bare
    /// array of record objects.
    #[arg(long, value_name = "FILE", conflicts_with = "store_url")]
    pub local: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Writes to stdout when not set.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Keep running and refresh the report on an interval
    #[arg(short, long)]
    pub watch: bool,

    /// Refresh interval in seconds for --watch
    ///
    /// Defaults to the config file value, or 9000s (2.5h) like the
    /// original dashboard.
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Store request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .resumetrics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .resumetrics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate store URL format when no local file is given
        if let Some(ref url) = self.store_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Store URL must start with 'http://' or 'https://'".to_string());
            }
        } else if self.local.is_none() {
            return Err("Either --store-url or --local is required".to_string());
        }

        if self.pattern.trim().is_empty() {
            return Err("Pattern must not be empty".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate interval if provided
        if let Some(interval) = self.interval {
            if interval == 0 {
                return Err("Interval must be at least 1 second".to_string());
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate local file if provided
        if let Some(ref local_path) = self.local {
            if !local_path.exists() {
                return Err(format!(
                    "Local records file does not exist: {}",
                    local_path.display()
                ));
            }
            if !local_path.is_file() {
                return Err(format!(
                    "Local records path is not a file: {}",
                    local_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
