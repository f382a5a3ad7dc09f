//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: per-video metrics and channel snapshots
    r#"
    CREATE TABLE IF NOT EXISTS video_metrics (
        video_id           TEXT PRIMARY KEY,
        title              TEXT NOT NULL,
        published_at       DATETIME NOT NULL,
        views              INTEGER NOT NULL DEFAULT 0,
        likes              INTEGER NOT NULL DEFAULT 0,
        comments           INTEGER NOT NULL DEFAULT 0,
        impressions        INTEGER,
        ctr                REAL,
        watch_time_hours   REAL,
        subscribers_gained INTEGER,
        duration_seconds   INTEGER,
        reach_estimated    INTEGER NOT NULL DEFAULT 0,
        created_at         DATETIME NOT NULL,
        updated_at         DATETIME NOT NULL
    );

    CREATE TABLE IF NOT EXISTS channel_stats (
        channel_id         TEXT PRIMARY KEY,
        channel_name       TEXT NOT NULL,
        total_subscribers  INTEGER NOT NULL,
        total_views        INTEGER NOT NULL,
        total_videos       INTEGER NOT NULL,
        fetched_at         DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_video_metrics_published ON video_metrics(published_at);
    "#,
    // Version 2: import checkpoints
    r#"
    CREATE TABLE IF NOT EXISTS import_log (
        source_path        TEXT PRIMARY KEY,
        content_hash       TEXT NOT NULL,
        row_count          INTEGER NOT NULL,
        run_id             TEXT NOT NULL,
        imported_at        DATETIME NOT NULL
    );
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
