//! YouTube Studio CSV exports.
//!
//! Studio writes one row per video plus a leading "Total" row with an empty
//! identifier. Numeric cells may carry thousands separators and CTR may carry
//! a trailing `%`, so every cell is read as text and parsed leniently.

use super::transform::{parse_count, parse_duration, parse_number, RawVideo};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::io::Read;

/// Columns without which an export cannot be imported.
pub const REQUIRED_COLUMNS: &[&str] = &["Video ID", "Video title", "Publish date", "Views"];

#[derive(Debug, Deserialize)]
struct StudioRow {
    #[serde(rename = "Video ID")]
    video_id: Option<String>,
    #[serde(rename = "Video title")]
    title: Option<String>,
    #[serde(rename = "Publish date")]
    published_at: Option<String>,
    #[serde(rename = "Views")]
    views: Option<String>,
    #[serde(rename = "Likes", default)]
    likes: Option<String>,
    #[serde(rename = "Comments", default)]
    comments: Option<String>,
    #[serde(rename = "Impressions", default)]
    impressions: Option<String>,
    #[serde(rename = "Click-through rate (CTR)", default)]
    ctr: Option<String>,
    #[serde(rename = "Watch time (hours)", default)]
    watch_time_hours: Option<String>,
    #[serde(rename = "Subscribers", default)]
    subscribers: Option<String>,
    #[serde(rename = "Duration", default)]
    duration: Option<String>,
}

impl From<StudioRow> for RawVideo {
    fn from(row: StudioRow) -> Self {
        let number = |cell: &Option<String>| cell.as_deref().and_then(parse_number);
        let count = |cell: &Option<String>| cell.as_deref().and_then(parse_count);
        RawVideo {
            views: count(&row.views),
            likes: count(&row.likes),
            comments: count(&row.comments),
            impressions: count(&row.impressions),
            ctr: number(&row.ctr),
            watch_time_hours: number(&row.watch_time_hours),
            subscribers_gained: count(&row.subscribers),
            duration_seconds: row.duration.as_deref().and_then(parse_duration),
            video_id: row.video_id.filter(|id| !id.trim().is_empty()),
            title: row.title,
            published_at: row.published_at,
        }
    }
}

/// Parse a Studio export.
///
/// Fails with [`Error::InvalidInput`] when a required column is missing.
/// Rows without a video identifier (the totals row) are skipped.
pub fn parse_studio_csv<R: Read>(reader: R) -> Result<Vec<RawVideo>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(Error::InvalidInput(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<StudioRow>() {
        let raw = RawVideo::from(result?);
        if raw.video_id.is_none() {
            tracing::debug!(title = ?raw.title, "Skipping row without video id");
            continue;
        }
        rows.push(raw);
    }

    tracing::debug!(rows = rows.len(), "Parsed Studio CSV");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Video ID,Video title,Publish date,Views,Likes,Comments,Impressions,Click-through rate (CTR),Watch time (hours),Subscribers,Duration
,Total,,\"3,500\",175,35,20000,,120.5,40,
abc123,How to Edit Faster,2024-01-15,\"1,500\",75,15,9000,4.8%,50.25,12,612
def456,Top 10 Camera Tips,\"Jan 22, 2024\",2000,100,20,11000,5.1,70.25,28,8:30
";

    #[test]
    fn test_parse_studio_export() {
        let rows = parse_studio_csv(EXPORT.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.video_id.as_deref(), Some("abc123"));
        assert_eq!(first.views, Some(1500));
        assert_eq!(first.ctr, Some(4.8));
        assert_eq!(first.watch_time_hours, Some(50.25));
        assert_eq!(first.subscribers_gained, Some(12));
        assert_eq!(first.duration_seconds, Some(612));

        assert_eq!(rows[1].published_at.as_deref(), Some("Jan 22, 2024"));
        assert_eq!(rows[1].duration_seconds, Some(510));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let export = "Video ID,Video title,Publish date,Views\nv1,Short one,2024-02-01,10\n";
        let rows = parse_studio_csv(export.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].likes, None);
        assert_eq!(rows[0].impressions, None);
    }

    #[test]
    fn test_missing_required_column() {
        let export = "Video ID,Video title,Views\nv1,t,10\n";
        let err = parse_studio_csv(export.as_bytes()).unwrap_err();
        match err {
            Error::InvalidInput(message) => assert!(message.contains("Publish date")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
