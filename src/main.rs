//! journey-stats - travel statistics over recorded journeys
//!
//! Module structure:
//! - `domain/` - Core types (Journey, Section, Pass, Period, reports)
//! - `io/` - Journey store collaborators (SQLite, in-memory)
//! - `services/` - Distance calculator and statistics aggregator
//! - `infra/` - Infrastructure (Config, Metrics)

use anyhow::Context;
use clap::{Parser, Subcommand};
use journey_stats::domain::{Journey, JourneyId, RequestContext};
use journey_stats::infra::{Config, Metrics};
use journey_stats::io::SqliteStore;
use journey_stats::services::StatsService;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Travel statistics over recorded journeys
#[derive(Parser, Debug)]
#[command(name = "journey-stats", version, about)]
struct Args {
    /// Path to TOML configuration file (falls back to CONFIG_FILE, then config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import journeys from a JSONL file (one journey per line)
    Import {
        #[arg(short, long)]
        file: String,
    },
    /// Statistics for a single journey
    One {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        journey: String,
    },
    /// Totals over all of a user's journeys
    All {
        #[arg(short, long)]
        user: String,
    },
    /// Totals over a user's journeys within a period (all, week, month, year)
    Period {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        period: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default: INFO, use RUST_LOG=debug for per-request detail
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = Config::resolve_config_path(args.config.as_deref());
    let config = Config::load_from_path(&config_path);

    info!(
        config_file = %config.config_file(),
        store_path = %config.store_path(),
        query_timeout_ms = %config.query_timeout_ms(),
        metric = %config.metric().as_str(),
        "config_loaded"
    );

    let store = Arc::new(
        SqliteStore::open(Path::new(config.store_path()))
            .with_context(|| format!("Failed to open journey store {}", config.store_path()))?,
    );

    let metrics = Arc::new(Metrics::new());
    let stats = StatsService::new(Arc::clone(&store), &config, Arc::clone(&metrics));

    match args.command {
        Command::Import { file } => {
            let imported = import_journeys(&store, Path::new(&file))?;
            info!(file = %file, imported = %imported, "journeys_imported");
        }
        Command::One { user, journey } => {
            let report = stats.get_one(&RequestContext::new(user), &JourneyId(journey)).await?;
            print_json(&report)?;
        }
        Command::All { user } => {
            let report = stats.get_all(&RequestContext::new(user)).await?;
            print_json(&report)?;
        }
        Command::Period { user, period } => {
            let report = stats.get_period(&RequestContext::new(user), &period).await?;
            print_json(&report)?;
        }
    }

    metrics.report().log();
    Ok(())
}

/// Read one journey JSON per line and insert each into the store
fn import_journeys(store: &SqliteStore, path: &Path) -> anyhow::Result<usize> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut imported = 0;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let journey: Journey = serde_json::from_str(&line)
            .with_context(|| format!("Invalid journey at {}:{}", path.display(), index + 1))?;
        store
            .insert_journey(&journey)
            .with_context(|| format!("Failed to insert journey {} from line {}", journey.id, index + 1))?;
        imported += 1;
    }
    Ok(imported)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
