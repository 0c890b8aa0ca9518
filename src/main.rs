//! Resumetrics - analytics for resume-review records
//!
//! A CLI tool that reads resume records from an external key-value
//! store, computes an analytics snapshot (totals, per-job histogram,
//! 14-day upload window, match statistics), and renders it as Markdown
//! or JSON. One-shot by default; --watch keeps refreshing on a fixed
//! interval until interrupted.
//!
//! Exit codes:
//!   0 - Success (including "no analytics data": the snapshot degrades
//!       to absent on store failures, it never aborts the run)
//!   1 - Runtime error (bad arguments, config, output path, etc.)

mod analytics;
mod cli;
mod config;
mod models;
mod report;
mod store;

use analytics::{AnalyticsWorker, WorkerOptions};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::AnalyticsSnapshot;
use report::ReportContext;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use store::{HttpKvStore, KvStore, MemoryStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Resumetrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .resumetrics.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".resumetrics.toml");

    if path.exists() {
        eprintln!("⚠️  .resumetrics.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .resumetrics.toml")?;

    println!("✅ Created .resumetrics.toml with default settings.");
    println!("   Edit it to customize the store endpoint, pattern, and refresh interval.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run in one-shot or watch mode.
async fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let (store, source) = build_store(&args, &config)?;
    let pattern = config.store.pattern.clone();

    if args.watch {
        run_watch(args, config, store, source, pattern).await
    } else {
        run_once(&args, &config, store.as_ref(), &source, &pattern).await
    }
}

/// Compute one snapshot and render it.
async fn run_once(
    args: &Args,
    config: &Config,
    store: &dyn KvStore,
    source: &str,
    pattern: &str,
) -> Result<()> {
    // A store failure degrades to the absent snapshot; it is not fatal.
    let snapshot = match analytics::refresh(store, pattern).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(error = %e, "store read failed, no analytics data");
            None
        }
    };

    let context = ReportContext {
        source: source.to_string(),
        pattern: pattern.to_string(),
        generated_at: Utc::now(),
    };
    let rendered = render(snapshot.as_ref(), args.format, &context)?;
    write_output(&config.report.output, &rendered)
}

/// Keep refreshing and re-rendering until Ctrl-C.
async fn run_watch(
    args: Args,
    config: Config,
    store: Arc<dyn KvStore>,
    source: String,
    pattern: String,
) -> Result<()> {
    let interval = Duration::from_secs(config.analytics.refresh_interval_seconds);
    info!(
        interval_seconds = interval.as_secs(),
        "watch mode: refreshing on interval, Ctrl-C to stop"
    );

    let worker = AnalyticsWorker::spawn(
        store,
        WorkerOptions {
            pattern: pattern.clone(),
            interval,
        },
    );
    let mut rx = worker.subscribe();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                let context = ReportContext {
                    source: source.clone(),
                    pattern: pattern.clone(),
                    generated_at: Utc::now(),
                };
                let rendered = render(snapshot.as_ref(), args.format, &context)?;
                write_output(&config.report.output, &rendered)?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    worker.stop().await;
    Ok(())
}

/// Build the injected store and a human-readable source label.
fn build_store(args: &Args, config: &Config) -> Result<(Arc<dyn KvStore>, String)> {
    if let Some(ref local) = args.local {
        let store = MemoryStore::from_json_file(local)
            .with_context(|| format!("Failed to load records from {}", local.display()))?;
        info!(
            records = store.len(),
            "loaded records from {}",
            local.display()
        );
        return Ok((Arc::new(store), local.display().to_string()));
    }

    let base_url = config.store.base_url.clone();
    let store = HttpKvStore::new(&base_url, config.store.timeout_seconds)
        .context("Failed to create store client")?;
    Ok((Arc::new(store), base_url))
}

/// Render a snapshot (or its absence) in the requested format.
fn render(
    snapshot: Option<&AnalyticsSnapshot>,
    format: OutputFormat,
    context: &ReportContext,
) -> Result<String> {
    match snapshot {
        Some(snapshot) => match format {
            OutputFormat::Markdown => Ok(report::generate_markdown_report(snapshot, context)),
            OutputFormat::Json => report::generate_json_report(snapshot),
        },
        None => Ok(match format {
            OutputFormat::Markdown => "No analytics data available.\n".to_string(),
            OutputFormat::Json => "null\n".to_string(),
        }),
    }
}

/// Write the rendered report to the configured destination.
fn write_output(output: &str, content: &str) -> Result<()> {
    if output.is_empty() {
        print!("{}", content);
        if !content.ends_with('\n') {
            println!();
        }
    } else {
        std::fs::write(output, content)
            .with_context(|| format!("Failed to write report to {}", output))?;
        info!("report written to {}", output);
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .resumetrics.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
