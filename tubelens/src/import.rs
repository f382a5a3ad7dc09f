//! tubelens-import - CLI tool to load channel exports into the database
//!
//! Reads YouTube Studio CSV exports and API-shaped JSON, or generates a
//! synthetic channel, and upserts the normalized records.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/tubelens/tubelens.db (~/.local/share/tubelens/tubelens.db)
//! - Logs: $XDG_STATE_HOME/tubelens/tubelens.log.<date> (~/.local/state/tubelens/)
//! - Config: $XDG_CONFIG_HOME/tubelens/config.toml (~/.config/tubelens/config.toml)

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tubelens_core::{ChannelStats, Config, Database, ImportResult, Importer};

/// Channel id used for derived snapshots when none is configured.
const LOCAL_CHANNEL_ID: &str = "local";

#[derive(Parser)]
#[command(name = "tubelens-import")]
#[command(about = "Load YouTube channel exports into the tubelens database")]
#[command(version)]
struct Args {
    /// Glob of Studio CSV exports (e.g. "exports/*.csv")
    #[arg(long)]
    csv: Option<String>,

    /// API-shaped JSON file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Generate N synthetic videos instead of reading files
    #[arg(long, conflicts_with_all = ["csv", "json"])]
    demo: Option<usize>,

    /// Seed for --demo
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Parse and report without writing to the database
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.csv.is_none() && args.json.is_none() && args.demo.is_none() {
        anyhow::bail!("Nothing to import. Pass --csv <glob>, --json <file> or --demo <count>");
    }

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = tubelens_core::logging::init(&config.logging).ok();

    tracing::info!("tubelens-import starting");

    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    println!("Database: {}", db_path.display());
    println!("Log:      {}", tubelens_core::logging::log_file_path().display());

    let importer = Importer::new(&db).dry_run(args.dry_run);
    let result = match args.demo {
        Some(count) => importer
            .import_demo(count, args.seed, Utc::now())
            .context("failed to import demo data")?,
        None => importer
            .import(args.csv.as_deref(), args.json.as_deref())
            .context("import failed")?,
    };

    print_result(&result, args.dry_run);

    if !args.dry_run {
        refresh_channel_stats(&db, &config).context("failed to update channel stats")?;
    }

    if !result.errors.is_empty() && result.files_processed == 0 {
        anyhow::bail!("No files could be imported");
    }

    Ok(())
}

fn print_result(result: &ImportResult, dry_run: bool) {
    println!();
    if dry_run {
        println!("Dry run - nothing written");
    }
    println!("Import complete:");
    println!("  Run:               {}", result.run_id);
    println!("  Files processed:   {}", result.files_processed);
    println!("  Files skipped:     {}", result.files_skipped);
    println!("  Records imported:  {}", result.records_imported);

    if result.impressions_estimated {
        println!("  Note: impressions estimated as 3x views (no reach data in source)");
    }
    if result.subscribers_estimated {
        println!("  Note: subscribers estimated from engagement (no subscriber data in source)");
    }

    if !result.warnings.is_empty() {
        println!();
        println!("Warnings ({}):", result.warnings.len());
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    if !result.errors.is_empty() {
        println!();
        println!("Errors ({}):", result.errors.len());
        for (path, error) in &result.errors {
            println!("  - {}: {}", path.display(), error);
        }
    }
}

/// Store a channel snapshot derived from everything now in the database.
fn refresh_channel_stats(db: &Database, config: &Config) -> Result<()> {
    let records = db.load_records()?;
    let channel_id = config
        .channel
        .channel_id
        .clone()
        .unwrap_or_else(|| LOCAL_CHANNEL_ID.to_string());
    let stats = ChannelStats::from_records(channel_id.clone(), channel_id, &records, Utc::now());
    db.upsert_channel_stats(&stats)?;
    tracing::debug!(videos = stats.total_videos, "Channel stats refreshed");
    Ok(())
}
