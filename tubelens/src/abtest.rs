//! tubelens-abtest - Title and thumbnail A/B simulation
//!
//! Titles are scored against the channel's own history; thumbnails are
//! scored from image features alone and need no database.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tubelens_core::analytics::{
    compare_thumbnail_bytes, run_title_test, title_length_analysis, Analysis,
    ThumbnailComparison, TitleTestResult, Winner,
};
use tubelens_core::format::format_delta;
use tubelens_core::{Config, Database};

#[derive(Parser)]
#[command(name = "tubelens-abtest")]
#[command(about = "Compare two titles or two thumbnails before publishing")]
#[command(version)]
struct Args {
    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare a current title (A) with a candidate (B)
    Title {
        /// Current title
        title_a: String,
        /// Candidate title
        title_b: String,
    },
    /// Compare two thumbnail images (PNG or JPEG)
    Thumbnail {
        /// First image
        image_a: PathBuf,
        /// Second image
        image_b: PathBuf,
    },
    /// Show how title length relates to views on this channel
    Lengths,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = tubelens_core::logging::init(&config.logging).ok();

    match args.command {
        Command::Title { title_a, title_b } => {
            let db = open_database()?;
            let records = db.load_records().context("failed to load records")?;
            tracing::info!(videos = records.len(), "Running title test");

            let result = run_title_test(&records, &title_a, &title_b);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_title_result(&result);
            }
        }
        Command::Thumbnail { image_a, image_b } => {
            let a = std::fs::read(&image_a)
                .with_context(|| format!("failed to read {}", image_a.display()))?;
            let b = std::fs::read(&image_b)
                .with_context(|| format!("failed to read {}", image_b.display()))?;

            let result = compare_thumbnail_bytes(&a, &b);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_thumbnail_result(&result);
            }
            if let Some(error) = result.error {
                anyhow::bail!(error);
            }
        }
        Command::Lengths => {
            let db = open_database()?;
            let records = db.load_records().context("failed to load records")?;
            let analysis = title_length_analysis(&records);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                match analysis {
                    Analysis::Ready { value } => {
                        println!("Title length vs views");
                        for bin in &value.bins {
                            println!(
                                "  {:<11} {:>4} videos  {:>10.0} avg views",
                                bin.label, bin.count, bin.avg_views
                            );
                        }
                        println!();
                        println!("{}", value.recommendation);
                    }
                    Analysis::Insufficient { reason } => println!("{}", reason),
                }
            }
        }
    }

    Ok(())
}

fn open_database() -> Result<Database> {
    let db_path = Config::database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;
    Ok(db)
}

fn print_title_result(result: &TitleTestResult) {
    let sim = &result.simulation;

    println!("A: {}", sim.current_title);
    println!("B: {}", sim.new_title);
    println!();
    println!(
        "Expected change: {} ({})",
        format_delta(sim.expected_improvement),
        sim.expected_views_change
    );
    println!("Confidence:      {}", sim.confidence);
    println!("Verdict:         {}", result.verdict.as_str());
    println!("{}", sim.sample_message);

    if !sim.pattern_details.is_empty() {
        println!();
        println!("Pattern changes:");
        for change in &sim.pattern_details {
            println!(
                "  {:?} {}: {} ({} videos)",
                change.change,
                change.pattern.as_str(),
                format_delta(change.expected_impact),
                change.sample_size
            );
        }
    }

    println!();
    println!("{}", sim.recommendation);
    println!();
    println!("Tips for B:");
    for tip in &result.improvement_tips {
        println!("  - {}", tip);
    }
}

fn print_thumbnail_result(result: &ThumbnailComparison) {
    if let Some(error) = &result.error {
        println!("{}: {}", result.recommendation, error);
        return;
    }

    let winner = match result.winner {
        Some(Winner::A) => "Thumbnail A",
        Some(Winner::B) => "Thumbnail B",
        Some(Winner::Tie) | None => "Tie",
    };
    println!("Score A: {}", result.score_a);
    for reason in &result.reasons_a {
        println!("  + {}", reason);
    }
    println!("Score B: {}", result.score_b);
    for reason in &result.reasons_b {
        println!("  + {}", reason);
    }
    println!();
    println!("Winner: {}", winner);
    println!("{}", result.recommendation);

    if !result.improvement_tips.is_empty() {
        println!();
        println!("Tips:");
        for tip in &result.improvement_tips {
            println!("  - {}", tip);
        }
    }
}
