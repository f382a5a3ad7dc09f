//! Raw export rows to [`VideoRecord`]s.
//!
//! Sources disagree on which fields they carry. Every parser produces
//! [`RawVideo`]s with optional fields; [`merge_sources`] combines them with an
//! explicit precedence (CSV, else API, else absent) and [`normalize`] fills
//! the remaining gaps with labelled estimates.

use crate::types::{RecordSet, VideoRecord};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::HashMap;

/// Impressions synthesized per view when no source carries impressions.
pub const ESTIMATED_IMPRESSIONS_PER_VIEW: u64 = 3;

/// Share of likes + comments assumed to convert into subscribers.
pub const ESTIMATED_SUBSCRIBER_RATE: f64 = 0.1;

/// One video as read from a source, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawVideo {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub impressions: Option<u64>,
    pub ctr: Option<f64>,
    pub watch_time_hours: Option<f64>,
    pub subscribers_gained: Option<u64>,
    pub duration_seconds: Option<u32>,
}

/// Records ready for storage plus what was dropped along the way.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: RecordSet,
    pub warnings: Vec<String>,
    /// Impressions were synthesized from views
    pub impressions_estimated: bool,
    /// Subscribers were synthesized from engagement
    pub subscribers_estimated: bool,
}

/// First present value: CSV, else API.
pub fn merge_field<T>(csv: Option<T>, api: Option<T>) -> Option<T> {
    csv.or(api)
}

fn merge_one(csv: RawVideo, api: RawVideo) -> RawVideo {
    RawVideo {
        video_id: merge_field(csv.video_id, api.video_id),
        title: merge_field(csv.title, api.title),
        published_at: merge_field(csv.published_at, api.published_at),
        views: merge_field(csv.views, api.views),
        likes: merge_field(csv.likes, api.likes),
        comments: merge_field(csv.comments, api.comments),
        impressions: merge_field(csv.impressions, api.impressions),
        ctr: merge_field(csv.ctr, api.ctr),
        watch_time_hours: merge_field(csv.watch_time_hours, api.watch_time_hours),
        subscribers_gained: merge_field(csv.subscribers_gained, api.subscribers_gained),
        duration_seconds: merge_field(csv.duration_seconds, api.duration_seconds),
    }
}

/// Combine API rows with CSV rows on `video_id`.
///
/// API order is kept; CSV-only videos follow in CSV order. Rows without an
/// identifier pass through untouched so [`normalize`] can report them.
pub fn merge_sources(csv: Vec<RawVideo>, api: Vec<RawVideo>) -> Vec<RawVideo> {
    if api.is_empty() {
        return csv;
    }
    if csv.is_empty() {
        return api;
    }

    let mut by_id: HashMap<String, RawVideo> = HashMap::new();
    let mut csv_order = Vec::new();
    let mut anonymous = Vec::new();
    for row in csv {
        match row.video_id.clone() {
            Some(id) => {
                if by_id.insert(id.clone(), row).is_none() {
                    csv_order.push(id);
                }
            }
            None => anonymous.push(row),
        }
    }

    let mut merged = Vec::with_capacity(api.len() + csv_order.len());
    for row in api {
        let csv_row = row.video_id.as_ref().and_then(|id| by_id.remove(id));
        merged.push(match csv_row {
            Some(csv_row) => merge_one(csv_row, row),
            None => row,
        });
    }
    merged.extend(csv_order.into_iter().filter_map(|id| by_id.remove(&id)));
    merged.extend(anonymous);
    merged
}

/// Validate rows and fill estimated fields.
///
/// - rows without an identifier or a parseable publish time are dropped
/// - when no row has impressions, impressions = 3 × views and the record is
///   marked `reach_estimated`
/// - when no row has subscribers, subscribers = ⌊(likes + comments) × 0.1⌋
/// - duplicates keep their last occurrence
pub fn normalize(rows: Vec<RawVideo>) -> Normalized {
    let mut warnings = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (line, row) in rows.into_iter().enumerate() {
        let Some(video_id) = row.video_id.filter(|id| !id.trim().is_empty()) else {
            warnings.push(format!("row {}: missing video id, skipped", line + 1));
            continue;
        };
        let Some(published_at) = row.published_at.as_deref().and_then(parse_timestamp) else {
            warnings.push(format!(
                "video {}: unparseable publish date {:?}, skipped",
                video_id,
                row.published_at.unwrap_or_default()
            ));
            continue;
        };

        let mut record = VideoRecord::new(
            video_id.trim(),
            row.title.unwrap_or_default(),
            published_at,
            row.views.unwrap_or(0),
            row.likes.unwrap_or(0),
            row.comments.unwrap_or(0),
        );
        record.impressions = row.impressions;
        record.ctr = row.ctr;
        record.watch_time_hours = row.watch_time_hours;
        record.subscribers_gained = row.subscribers_gained;
        record.duration_seconds = row.duration_seconds;
        records.push(record);
    }

    let impressions_estimated = !records.is_empty()
        && records.iter().map(|r| r.impressions.unwrap_or(0)).sum::<u64>() == 0;
    if impressions_estimated {
        for record in &mut records {
            record.impressions = Some(record.views * ESTIMATED_IMPRESSIONS_PER_VIEW);
            record.reach_estimated = true;
        }
    }

    let subscribers_estimated = !records.is_empty()
        && records
            .iter()
            .map(|r| r.subscribers_gained.unwrap_or(0))
            .sum::<u64>()
            == 0;
    if subscribers_estimated {
        for record in &mut records {
            let engaged = (record.likes + record.comments) as f64;
            record.subscribers_gained = Some((engaged * ESTIMATED_SUBSCRIBER_RATE).floor() as u64);
        }
    }

    Normalized {
        records: RecordSet::dedup_last(records),
        warnings,
        impressions_estimated,
        subscribers_estimated,
    }
}

// ============================================
// Field parsing
// ============================================

/// Parse a publish time.
///
/// Offsets in the text are kept; times without one are taken as UTC.
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD` and Studio's `Jan 5, 2024`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    for format in ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    None
}

/// Parse a numeric cell, tolerating thousands separators and a trailing `%`.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative count, truncating any fractional part.
pub fn parse_count(text: &str) -> Option<u64> {
    parse_number(text).map(|v| v.max(0.0) as u64)
}

/// Parse a video length: plain seconds, `MM:SS`, `H:MM:SS` or ISO 8601 (`PT1H2M3S`).
pub fn parse_duration(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(iso) = text.strip_prefix("PT") {
        return parse_iso_duration(iso);
    }
    if text.contains(':') {
        let mut total: u32 = 0;
        for part in text.split(':') {
            total = total.checked_mul(60)?.checked_add(part.parse::<u32>().ok()?)?;
        }
        return Some(total);
    }
    parse_number(text).map(|v| v.max(0.0) as u32)
}

fn parse_iso_duration(text: &str) -> Option<u32> {
    let mut total: u32 = 0;
    let mut digits = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: u32 = digits.parse().ok()?;
        digits.clear();
        let unit = match c {
            'H' => 3600,
            'M' => 60,
            'S' => 1,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(unit)?)?;
    }
    digits.is_empty().then_some(total)
}
