//! # tubelens-core
//!
//! Core library for tubelens - analytics for a single YouTube channel.
//!
//! This library provides:
//! - Domain types for videos and channels
//! - Analytics over a channel's publish history
//! - Database storage layer with SQLite
//! - Ingestion of Studio CSV exports, API JSON and demo data
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three layers:
//! - **Sources:** export files or generated demo data (never modified)
//! - **Store:** normalized `video_metrics` rows in SQLite
//! - **Analytics:** pure functions of a [`RecordSet`], recomputed on demand
//!
//! ## Example
//!
//! ```rust,no_run
//! use tubelens_core::analytics::{generate_report, ReportOptions};
//! use tubelens_core::{Config, Database};
//!
//! let config = Config::load().expect("failed to load config");
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let records = db.load_records().expect("failed to load records");
//! let options = ReportOptions::from_config(&config.analytics, chrono::Utc::now());
//! let report = generate_report(&records, &options);
//! println!("{} videos, {} total views", report.video_count, report.summary.total_views);
//! ```

// Re-export commonly used items at the crate root
pub use analytics::Analysis;
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use ingest::{ImportResult, Importer};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod types;
