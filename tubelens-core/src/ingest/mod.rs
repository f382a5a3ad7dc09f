//! Ingestion layer for loading channel exports
//!
//! This module turns export files into stored [`VideoRecord`](crate::types::VideoRecord)s.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Export files   │ ──► │     Importer     │ ──► │    Database     │
//! │ (*.csv, *.json) │     │                  │     │ (video_metrics) │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//!                               │
//!                               ▼
//!                    ┌──────────────────────┐
//!                    │  RawVideo rows       │
//!                    │  ├─ studio_csv       │
//!                    │  ├─ api_json         │
//!                    │  └─ merge, normalize │
//!                    └──────────────────────┘
//! ```
//!
//! Each file's SHA-256 is recorded after a successful import; a file whose
//! contents have not changed since is skipped. Records from a skipped file
//! stay as stored.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tubelens_core::{Config, Database};
//! use tubelens_core::ingest::Importer;
//!
//! let db = Database::open(&Config::database_path())?;
//! db.migrate()?;
//! let result = Importer::new(&db).import(Some("exports/*.csv"), None)?;
//! println!("Imported {} videos from {} files", result.records_imported, result.files_processed);
//! ```

pub mod api_json;
pub mod demo;
pub mod studio_csv;
pub mod transform;

pub use api_json::parse_api_json;
pub use demo::generate_demo;
pub use studio_csv::parse_studio_csv;
pub use transform::{merge_field, merge_sources, normalize, Normalized, RawVideo};

use crate::db::{Database, ImportCheckpoint};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Source file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// YouTube Studio CSV export
    StudioCsv,
    /// API-shaped JSON
    ApiJson,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::StudioCsv => "studio_csv",
            ExportFormat::ApiJson => "api_json",
        }
    }

    /// Guess the format from a file extension (`.json`, else CSV).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::ApiJson,
            _ => ExportFormat::StudioCsv,
        }
    }

    /// Parse file contents in this format.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<RawVideo>> {
        match self {
            ExportFormat::StudioCsv => parse_studio_csv(bytes),
            ExportFormat::ApiJson => parse_api_json(bytes),
        }
    }
}

/// Result of one import run.
#[derive(Debug, Default)]
pub struct ImportResult {
    /// Unique id for this run (appears in logs and checkpoints)
    pub run_id: String,
    /// Files read and parsed
    pub files_processed: usize,
    /// Files skipped (unchanged or empty)
    pub files_skipped: usize,
    /// Videos written (or that would be written, on a dry run)
    pub records_imported: usize,
    /// Impressions were synthesized because no source carried them
    pub impressions_estimated: bool,
    /// Subscribers were synthesized because no source carried them
    pub subscribers_estimated: bool,
    /// Errors encountered (file path → error message)
    pub errors: Vec<(PathBuf, String)>,
    /// Warnings from parsing and normalization
    pub warnings: Vec<String>,
}

/// Reason a file was skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Contents match the last successful import
    Unchanged { hash: String },
    /// File is empty
    EmptyFile,
}

/// One file after reading.
#[derive(Debug)]
pub struct FileRead {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub hash: String,
    pub rows: Vec<RawVideo>,
    pub skip_reason: Option<SkipReason>,
}

/// Loads exports into the database.
pub struct Importer<'a> {
    db: &'a Database,
    run_id: String,
    dry_run: bool,
}

impl<'a> Importer<'a> {
    /// Create an importer with a fresh run id.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            run_id: uuid::Uuid::new_v4().to_string(),
            dry_run: false,
        }
    }

    /// Parse and report without writing records or checkpoints.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Expand a glob pattern into a sorted list of files.
    pub fn discover(pattern: &str) -> Result<Vec<PathBuf>> {
        let entries = glob::glob(pattern).map_err(|e| {
            Error::InvalidInput(format!("invalid glob pattern {:?}: {}", pattern, e))
        })?;
        let mut files: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
        files.sort();
        if files.is_empty() {
            return Err(Error::InvalidInput(format!(
                "no files match pattern {:?}",
                pattern
            )));
        }
        Ok(files)
    }

    /// Import Studio CSVs matching `csv_pattern` and/or one API JSON file.
    ///
    /// When both are given, CSV values take precedence per field.
    pub fn import(
        &self,
        csv_pattern: Option<&str>,
        json_path: Option<&Path>,
    ) -> Result<ImportResult> {
        let mut result = ImportResult {
            run_id: self.run_id.clone(),
            ..Default::default()
        };
        tracing::info!(run_id = %self.run_id, dry_run = self.dry_run, "Starting import");

        let mut csv_rows = Vec::new();
        let mut api_rows = Vec::new();
        let mut checkpoints = Vec::new();

        let mut paths: Vec<PathBuf> = match csv_pattern {
            Some(pattern) => Self::discover(pattern)?,
            None => Vec::new(),
        };
        if let Some(json) = json_path {
            paths.push(json.to_path_buf());
        }

        for path in paths {
            let format = ExportFormat::from_path(&path);
            match self.read_file(&path, format) {
                Ok(file) => {
                    if let Some(reason) = &file.skip_reason {
                        tracing::debug!(
                            path = %file.path.display(),
                            reason = ?reason,
                            "File skipped"
                        );
                        result.files_skipped += 1;
                        continue;
                    }
                    result.files_processed += 1;
                    checkpoints.push(ImportCheckpoint {
                        source_path: file.path.to_string_lossy().to_string(),
                        content_hash: file.hash,
                        row_count: file.rows.len(),
                        run_id: self.run_id.clone(),
                        imported_at: Utc::now(),
                    });
                    match file.format {
                        ExportFormat::StudioCsv => csv_rows.extend(file.rows),
                        ExportFormat::ApiJson => api_rows.extend(file.rows),
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read export");
                    result.errors.push((path, e.to_string()));
                }
            }
        }

        let normalized = normalize(merge_sources(csv_rows, api_rows));
        self.store(normalized, &checkpoints, &mut result)?;
        Ok(result)
    }

    /// Generate and import a synthetic channel.
    pub fn import_demo(&self, count: usize, seed: u64, now: DateTime<Utc>) -> Result<ImportResult> {
        let mut result = ImportResult {
            run_id: self.run_id.clone(),
            ..Default::default()
        };
        tracing::info!(run_id = %self.run_id, count, seed, "Generating demo data");

        let records = generate_demo(count, seed, now);
        let normalized = Normalized {
            records,
            ..Default::default()
        };
        self.store(normalized, &[], &mut result)?;
        Ok(result)
    }

    /// Read and parse one file, checking it against its last checkpoint.
    pub fn read_file(&self, path: &Path, format: ExportFormat) -> Result<FileRead> {
        let bytes = std::fs::read(path)?;
        let hash = hash_bytes(&bytes);

        let skip_reason = if bytes.is_empty() {
            Some(SkipReason::EmptyFile)
        } else {
            self.db
                .get_import_checkpoint(&path.to_string_lossy())?
                .filter(|checkpoint| checkpoint.content_hash == hash)
                .map(|checkpoint| SkipReason::Unchanged {
                    hash: checkpoint.content_hash,
                })
        };

        let rows = if skip_reason.is_some() {
            Vec::new()
        } else {
            format.parse(&bytes)?
        };

        Ok(FileRead {
            path: path.to_path_buf(),
            format,
            hash,
            rows,
            skip_reason,
        })
    }

    fn store(
        &self,
        normalized: Normalized,
        checkpoints: &[ImportCheckpoint],
        result: &mut ImportResult,
    ) -> Result<()> {
        for warning in &normalized.warnings {
            tracing::warn!(run_id = %self.run_id, warning = %warning, "Import warning");
        }
        result.warnings.extend(normalized.warnings);
        result.impressions_estimated = normalized.impressions_estimated;
        result.subscribers_estimated = normalized.subscribers_estimated;
        result.records_imported = normalized.records.len();

        if self.dry_run {
            tracing::info!(
                run_id = %self.run_id,
                records = result.records_imported,
                "Dry run, nothing written"
            );
            return Ok(());
        }

        self.db.upsert_videos(normalized.records.as_slice())?;
        for checkpoint in checkpoints {
            self.db.record_import(checkpoint)?;
        }

        tracing::info!(
            run_id = %self.run_id,
            records = result.records_imported,
            files = result.files_processed,
            skipped = result.files_skipped,
            "Import complete"
        );
        Ok(())
    }
}

/// SHA-256 of `bytes`, hex encoded.
pub fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EXPORT: &str = "\
Video ID,Video title,Publish date,Views,Likes,Comments
a1,How to Start,2024-01-01,1000,50,10
a2,Top 5 Lenses,2024-01-03,3000,150,30
";

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("a.JSON")), ExportFormat::ApiJson);
        assert_eq!(ExportFormat::from_path(Path::new("a.csv")), ExportFormat::StudioCsv);
        assert_eq!(ExportFormat::from_path(Path::new("export")), ExportFormat::StudioCsv);
    }

    #[test]
    fn test_hash_bytes() {
        assert_eq!(
            hash_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_import_and_skip_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, EXPORT).unwrap();
        let pattern = dir.path().join("*.csv").to_string_lossy().to_string();

        let db = test_db();
        let first = Importer::new(&db).import(Some(&pattern), None).unwrap();
        assert_eq!(first.files_processed, 1);
        assert_eq!(first.records_imported, 2);
        assert!(first.impressions_estimated);
        assert_eq!(db.count_videos().unwrap(), 2);

        let second = Importer::new(&db).import(Some(&pattern), None).unwrap();
        assert_eq!(second.files_processed, 0);
        assert_eq!(second.files_skipped, 1);
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, EXPORT).unwrap();
        let pattern = dir.path().join("*.csv").to_string_lossy().to_string();

        let db = test_db();
        let result = Importer::new(&db)
            .dry_run(true)
            .import(Some(&pattern), None)
            .unwrap();
        assert_eq!(result.records_imported, 2);
        assert_eq!(db.count_videos().unwrap(), 0);
        assert!(db
            .get_import_checkpoint(&path.to_string_lossy())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_csv_overrides_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("export.csv"),
            "Video ID,Video title,Publish date,Views,Impressions\na1,CSV title,2024-01-01,1000,9000\n",
        )
        .unwrap();
        let json = dir.path().join("api.json");
        std::fs::write(
            &json,
            r#"[{"video_id": "a1", "title": "API title", "published_at": "2024-01-01T15:00:00Z",
                 "views": 1200, "likes": 60, "comments": 6},
                {"video_id": "b2", "title": "Only API", "published_at": "2024-01-02T15:00:00Z",
                 "views": 10}]"#,
        )
        .unwrap();
        let pattern = dir.path().join("*.csv").to_string_lossy().to_string();

        let db = test_db();
        let result = Importer::new(&db).import(Some(&pattern), Some(&json)).unwrap();
        assert_eq!(result.files_processed, 2);
        assert!(!result.impressions_estimated);

        let a1 = db.get_video("a1").unwrap().unwrap();
        assert_eq!(a1.title, "CSV title");
        assert_eq!(a1.views, 1000);
        assert_eq!(a1.likes, 60);
        assert_eq!(a1.impressions, Some(9000));
        assert!(db.get_video("b2").unwrap().is_some());
    }

    #[test]
    fn test_bad_file_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.csv"), EXPORT).unwrap();
        std::fs::write(dir.path().join("b.csv"), "Title,Views\nx,1\n").unwrap();
        let pattern = dir.path().join("*.csv").to_string_lossy().to_string();

        let db = test_db();
        let result = Importer::new(&db).import(Some(&pattern), None).unwrap();
        assert_eq!(result.files_processed, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].1.contains("missing required column"));
        assert_eq!(db.count_videos().unwrap(), 2);
    }

    #[test]
    fn test_no_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.csv").to_string_lossy().to_string();
        assert!(matches!(
            Importer::discover(&pattern),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_import_demo() {
        let db = test_db();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let result = Importer::new(&db).import_demo(25, 42, now).unwrap();
        assert_eq!(result.records_imported, 25);
        assert_eq!(db.load_records().unwrap().len(), 25);
    }
}
