//! Database repository layer
//!
//! Provides query and upsert operations for video metrics, channel stats and
//! import checkpoints.

use crate::error::{Error, Result};
use crate::types::{ChannelStats, RecordSet, VideoRecord};
use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A previously imported source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCheckpoint {
    /// Path as given to the importer
    pub source_path: String,
    /// SHA-256 of the file contents, hex encoded
    pub content_hash: String,
    /// Records read from the file
    pub row_count: usize,
    /// Import run that wrote this checkpoint
    pub run_id: String,
    pub imported_at: DateTime<Utc>,
}

/// Database handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        super::schema::run_migrations(&conn)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::Storage(format!("connection lock poisoned: {}", e)))
    }

    // ============================================
    // Video operations
    // ============================================

    /// Insert or update one video's metrics
    pub fn upsert_video(&self, video: &VideoRecord) -> Result<()> {
        let conn = self.conn()?;
        Self::upsert_video_on(&conn, video, Utc::now())
    }

    /// Insert or update many videos in a transaction
    pub fn upsert_videos(&self, videos: &[VideoRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now();

        for video in videos {
            Self::upsert_video_on(&tx, video, now)?;
        }

        tx.commit()?;
        tracing::debug!(count = videos.len(), "Upserted videos");
        Ok(videos.len())
    }

    fn upsert_video_on(conn: &Connection, video: &VideoRecord, now: DateTime<Utc>) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO video_metrics (video_id, title, published_at, views, likes, comments,
                                       impressions, ctr, watch_time_hours, subscribers_gained,
                                       duration_seconds, reach_estimated, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            ON CONFLICT(video_id) DO UPDATE SET
                title = excluded.title,
                published_at = excluded.published_at,
                views = excluded.views,
                likes = excluded.likes,
                comments = excluded.comments,
                impressions = excluded.impressions,
                ctr = excluded.ctr,
                watch_time_hours = excluded.watch_time_hours,
                subscribers_gained = excluded.subscribers_gained,
                duration_seconds = excluded.duration_seconds,
                reach_estimated = excluded.reach_estimated,
                updated_at = excluded.updated_at
            "#,
            params![
                video.video_id,
                video.title,
                video.published_at.to_rfc3339(),
                video.views as i64,
                video.likes as i64,
                video.comments as i64,
                video.impressions.map(|v| v as i64),
                video.ctr,
                video.watch_time_hours,
                video.subscribers_gained.map(|v| v as i64),
                video.duration_seconds,
                video.reach_estimated,
                now.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a video by ID
    pub fn get_video(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT * FROM video_metrics WHERE video_id = ?",
            [video_id],
            Self::row_to_video,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Every stored video as a [`RecordSet`]
    pub fn load_records(&self) -> Result<RecordSet> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT * FROM video_metrics ORDER BY published_at ASC")?;
        let videos = stmt
            .query_map([], Self::row_to_video)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        RecordSet::new(videos)
    }

    /// Videos published in `[start, end)`
    ///
    /// Timestamps keep their own offsets in storage, so the range is compared
    /// on instants after loading rather than on the stored text.
    pub fn load_records_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RecordSet> {
        let records = self.load_records()?;
        let kept: Vec<VideoRecord> = records
            .into_records()
            .into_iter()
            .filter(|r| {
                let ts = r.published_at.with_timezone(&Utc);
                ts >= start && ts < end
            })
            .collect();
        RecordSet::new(kept)
    }

    /// Delete a video, failing if it does not exist
    pub fn delete_video(&self, video_id: &str) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM video_metrics WHERE video_id = ?", [video_id])?;
        if deleted == 0 {
            return Err(Error::VideoNotFound(video_id.to_string()));
        }
        Ok(())
    }

    /// Count stored videos
    pub fn count_videos(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM video_metrics", [], |r| r.get(0))?;
        Ok(count)
    }

    fn row_to_video(row: &Row) -> rusqlite::Result<VideoRecord> {
        let published_str: String = row.get("published_at")?;
        let published_at = DateTime::<FixedOffset>::parse_from_rfc3339(&published_str)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(VideoRecord {
            video_id: row.get("video_id")?,
            title: row.get("title")?,
            published_at,
            views: row.get::<_, i64>("views")? as u64,
            likes: row.get::<_, i64>("likes")? as u64,
            comments: row.get::<_, i64>("comments")? as u64,
            impressions: row.get::<_, Option<i64>>("impressions")?.map(|v| v as u64),
            ctr: row.get("ctr")?,
            watch_time_hours: row.get("watch_time_hours")?,
            subscribers_gained: row
                .get::<_, Option<i64>>("subscribers_gained")?
                .map(|v| v as u64),
            duration_seconds: row.get("duration_seconds")?,
            reach_estimated: row.get("reach_estimated")?,
        })
    }

    // ============================================
    // Channel operations
    // ============================================

    /// Insert or update a channel snapshot
    pub fn upsert_channel_stats(&self, stats: &ChannelStats) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO channel_stats (channel_id, channel_name, total_subscribers,
                                       total_views, total_videos, fetched_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(channel_id) DO UPDATE SET
                channel_name = excluded.channel_name,
                total_subscribers = excluded.total_subscribers,
                total_views = excluded.total_views,
                total_videos = excluded.total_videos,
                fetched_at = excluded.fetched_at
            "#,
            params![
                stats.channel_id,
                stats.channel_name,
                stats.total_subscribers as i64,
                stats.total_views as i64,
                stats.total_videos as i64,
                stats.fetched_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get the latest snapshot for a channel
    pub fn get_channel_stats(&self, channel_id: &str) -> Result<Option<ChannelStats>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT * FROM channel_stats WHERE channel_id = ?",
            [channel_id],
            |row| {
                Ok(ChannelStats {
                    channel_id: row.get("channel_id")?,
                    channel_name: row.get("channel_name")?,
                    total_subscribers: row.get::<_, i64>("total_subscribers")? as u64,
                    total_views: row.get::<_, i64>("total_views")? as u64,
                    total_videos: row.get::<_, i64>("total_videos")? as u64,
                    fetched_at: utc_column(row, "fetched_at")?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // ============================================
    // Import checkpoints
    // ============================================

    /// Record that a source file was imported
    pub fn record_import(&self, checkpoint: &ImportCheckpoint) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO import_log (source_path, content_hash, row_count, run_id, imported_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(source_path) DO UPDATE SET
                content_hash = excluded.content_hash,
                row_count = excluded.row_count,
                run_id = excluded.run_id,
                imported_at = excluded.imported_at
            "#,
            params![
                checkpoint.source_path,
                checkpoint.content_hash,
                checkpoint.row_count as i64,
                checkpoint.run_id,
                checkpoint.imported_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get the checkpoint for a source path
    pub fn get_import_checkpoint(&self, source_path: &str) -> Result<Option<ImportCheckpoint>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT * FROM import_log WHERE source_path = ?",
            [source_path],
            |row| {
                Ok(ImportCheckpoint {
                    source_path: row.get("source_path")?,
                    content_hash: row.get("content_hash")?,
                    row_count: row.get::<_, i64>("row_count")? as usize,
                    run_id: row.get("run_id")?,
                    imported_at: utc_column(row, "imported_at")?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }
}

/// Read an RFC 3339 text column as UTC, failing on malformed text.
fn utc_column(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let idx = row.as_ref().column_index(column)?;
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
