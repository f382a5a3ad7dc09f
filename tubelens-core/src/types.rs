//! Core domain types for tubelens
//!
//! Every analytic in [`crate::analytics`] consumes a [`RecordSet`]: the
//! publish history of exactly one channel, one [`VideoRecord`] per video.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Engagement rate** | (likes + comments) / views × 100, 0 when views = 0 |
//! | **CTR proxy** | views / impressions × 100; an approximation of click-through rate |
//! | **Estimated reach** | impressions synthesized as 3× views when platform data is absent |
//!
//! Day-of-week and hour-of-day are methods over `published_at`, never stored,
//! so they cannot drift from the timestamp they describe.

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

// ============================================
// Calendar helpers
// ============================================

/// Weekdays in calendar order, Monday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name for a weekday.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a full English weekday name (case-insensitive).
pub fn parse_day_name(name: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .copied()
        .find(|day| day_name(*day).eq_ignore_ascii_case(name.trim()))
}

/// Full English name for a month (1-12).
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// Serde adapter writing weekdays as full names ("Monday").
pub mod weekday_name {
    use chrono::Weekday;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(super::day_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let name = String::deserialize(deserializer)?;
        super::parse_day_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown weekday: {}", name)))
    }
}

/// Serde adapter for lists of weekdays.
pub mod weekday_names {
    use chrono::Weekday;
    use serde::ser::SerializeSeq;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(super::day_name(*day))?;
        }
        seq.end()
    }
}

// ============================================
// VideoRecord
// ============================================

/// One published video and its counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video identifier, unique within a channel
    pub video_id: String,
    /// Video title as published
    pub title: String,
    /// Publish time; the offset is the source's own (UTC when unstated)
    pub published_at: DateTime<FixedOffset>,
    /// View count
    pub views: u64,
    /// Like count
    pub likes: u64,
    /// Comment count
    pub comments: u64,
    /// Impressions, when known
    pub impressions: Option<u64>,
    /// Click-through rate percentage, when known
    pub ctr: Option<f64>,
    /// Total watch time in hours
    pub watch_time_hours: Option<f64>,
    /// Subscribers gained from this video
    pub subscribers_gained: Option<u64>,
    /// Video length in seconds
    pub duration_seconds: Option<u32>,
    /// True when impressions / CTR were synthesized rather than measured
    #[serde(default)]
    pub reach_estimated: bool,
}

impl VideoRecord {
    /// Create a record with only the required counters.
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        published_at: DateTime<FixedOffset>,
        views: u64,
        likes: u64,
        comments: u64,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            published_at,
            views,
            likes,
            comments,
            impressions: None,
            ctr: None,
            watch_time_hours: None,
            subscribers_gained: None,
            duration_seconds: None,
            reach_estimated: false,
        }
    }

    /// Weekday of publication, in the timestamp's own offset.
    pub fn day_of_week(&self) -> Weekday {
        self.published_at.weekday()
    }

    /// Hour of publication (0-23), in the timestamp's own offset.
    pub fn hour(&self) -> u32 {
        self.published_at.hour()
    }

    /// Calendar date of publication.
    pub fn publish_date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }

    /// (likes + comments) / views × 100; 0 for unviewed videos.
    pub fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        (self.likes + self.comments) as f64 / self.views as f64 * 100.0
    }

    /// CTR percentage: the stored value, else views per impression.
    pub fn ctr_proxy(&self) -> Option<f64> {
        self.ctr.or_else(|| {
            self.impressions.map(|impressions| {
                if impressions == 0 {
                    0.0
                } else {
                    self.views as f64 / impressions as f64 * 100.0
                }
            })
        })
    }

    /// Title length in characters.
    pub fn title_len(&self) -> usize {
        self.title.chars().count()
    }

    /// Days between publication and `now`, at least 1.
    pub fn days_live(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.published_at).num_days().max(1)
    }
}

// ============================================
// RecordSet
// ============================================

/// A channel's videos ordered by (published_at, video_id).
///
/// Identifiers are unique. An empty set is valid input everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordSet {
    records: Vec<VideoRecord>,
}

impl RecordSet {
    /// Build a set, rejecting duplicate identifiers.
    pub fn new(records: Vec<VideoRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.video_id.as_str()) {
                return Err(Error::DuplicateVideo(record.video_id.clone()));
            }
        }
        Ok(Self::sorted(records))
    }

    /// Build a set keeping the last occurrence of each identifier.
    pub fn dedup_last(records: Vec<VideoRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let mut kept: Vec<VideoRecord> = records
            .into_iter()
            .rev()
            .filter(|record| seen.insert(record.video_id.clone()))
            .collect();
        kept.reverse();
        Self::sorted(kept)
    }

    /// An empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    fn sorted(mut records: Vec<VideoRecord>) -> Self {
        records.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.video_id.cmp(&b.video_id))
        });
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VideoRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<VideoRecord> {
        self.records
    }

    /// Look up a record by identifier.
    pub fn get(&self, video_id: &str) -> Option<&VideoRecord> {
        self.records.iter().find(|r| r.video_id == video_id)
    }

    /// Earliest publish time.
    pub fn first_published(&self) -> Option<DateTime<FixedOffset>> {
        self.records.first().map(|r| r.published_at)
    }

    /// Latest publish time.
    pub fn last_published(&self) -> Option<DateTime<FixedOffset>> {
        self.records.last().map(|r| r.published_at)
    }

    /// Number of distinct publish dates.
    pub fn distinct_days(&self) -> usize {
        self.records
            .iter()
            .map(VideoRecord::publish_date)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Mean views across all records, 0 when empty.
    pub fn mean_views(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().map(|r| r.views as f64).sum::<f64>() / self.records.len() as f64
    }

    /// True if any record's reach numbers are synthesized.
    pub fn has_estimated_reach(&self) -> bool {
        self.records.iter().any(|r| r.reach_estimated)
    }

    /// Offset label carried by the timestamps, if they all agree.
    ///
    /// Labeling only; no conversion is ever applied to the data.
    pub fn timezone_label(&self) -> Option<String> {
        let first = self.records.first()?.published_at.offset().fix();
        if self
            .records
            .iter()
            .any(|r| r.published_at.offset().fix() != first)
        {
            return None;
        }
        if first.local_minus_utc() == 0 {
            Some("UTC".to_string())
        } else {
            Some(format!("UTC{}", first))
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a VideoRecord;
    type IntoIter = std::slice::Iter<'a, VideoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ============================================
// Channel
// ============================================

/// Channel-level statistics as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub channel_id: String,
    pub channel_name: String,
    pub total_subscribers: u64,
    pub total_views: u64,
    pub total_videos: u64,
    pub fetched_at: DateTime<Utc>,
}

impl ChannelStats {
    /// Snapshot derived from stored records when no platform figures exist.
    ///
    /// Subscribers are the sum of per-video gains.
    pub fn from_records(
        channel_id: impl Into<String>,
        channel_name: impl Into<String>,
        records: &RecordSet,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_name: channel_name.into(),
            total_subscribers: records.iter().filter_map(|r| r.subscribers_gained).sum(),
            total_views: records.iter().map(|r| r.views).sum(),
            total_videos: records.len() as u64,
            fetched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn test_engagement_rate_zero_views() {
        let record = VideoRecord::new("a", "t", at(2024, 1, 1, 9), 0, 5, 5);
        assert_eq!(record.engagement_rate(), 0.0);

        let record = VideoRecord::new("a", "t", at(2024, 1, 1, 9), 200, 15, 5);
        assert!((record.engagement_rate() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_derived_fields_follow_timestamp() {
        // 2024-01-01 was a Monday
        let record = VideoRecord::new("a", "t", at(2024, 1, 1, 14), 10, 0, 0);
        assert_eq!(record.day_of_week(), Weekday::Mon);
        assert_eq!(record.hour(), 14);
        assert_eq!(record.day_of_week(), record.day_of_week());

        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let tokyo = offset.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        let record = VideoRecord::new("b", "t", tokyo, 10, 0, 0);
        assert_eq!(record.hour(), 2);
        assert_eq!(record.day_of_week(), Weekday::Mon);
    }

    #[test]
    fn test_ctr_proxy() {
        let mut record = VideoRecord::new("a", "t", at(2024, 1, 1, 9), 300, 0, 0);
        assert_eq!(record.ctr_proxy(), None);

        record.impressions = Some(900);
        assert!((record.ctr_proxy().unwrap() - 33.333).abs() < 0.01);

        record.impressions = Some(0);
        assert_eq!(record.ctr_proxy(), Some(0.0));

        record.ctr = Some(4.5);
        assert_eq!(record.ctr_proxy(), Some(4.5));
    }

    #[test]
    fn test_record_set_sorts_and_rejects_duplicates() {
        let records = vec![
            VideoRecord::new("b", "t", at(2024, 1, 2, 9), 1, 0, 0),
            VideoRecord::new("c", "t", at(2024, 1, 1, 9), 1, 0, 0),
            VideoRecord::new("a", "t", at(2024, 1, 2, 9), 1, 0, 0),
        ];
        let set = RecordSet::new(records).unwrap();
        let ids: Vec<_> = set.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(set.distinct_days(), 2);

        let dupes = vec![
            VideoRecord::new("a", "t", at(2024, 1, 2, 9), 1, 0, 0),
            VideoRecord::new("a", "t", at(2024, 1, 3, 9), 1, 0, 0),
        ];
        assert!(matches!(
            RecordSet::new(dupes),
            Err(Error::DuplicateVideo(id)) if id == "a"
        ));
    }

    #[test]
    fn test_dedup_last_keeps_latest_occurrence() {
        let records = vec![
            VideoRecord::new("a", "old", at(2024, 1, 2, 9), 1, 0, 0),
            VideoRecord::new("b", "t", at(2024, 1, 1, 9), 1, 0, 0),
            VideoRecord::new("a", "new", at(2024, 1, 2, 9), 7, 0, 0),
        ];
        let set = RecordSet::dedup_last(records);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("a").unwrap().title, "new");
        assert_eq!(set.get("a").unwrap().views, 7);
    }

    #[test]
    fn test_timezone_label() {
        let set = RecordSet::new(vec![VideoRecord::new("a", "t", at(2024, 1, 1, 9), 1, 0, 0)])
            .unwrap();
        assert_eq!(set.timezone_label().as_deref(), Some("UTC"));

        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let ts = offset.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let set = RecordSet::new(vec![VideoRecord::new("a", "t", ts, 1, 0, 0)]).unwrap();
        assert_eq!(set.timezone_label().as_deref(), Some("UTC+05:30"));

        assert_eq!(RecordSet::empty().timezone_label(), None);
    }

    #[test]
    fn test_day_names_round_trip() {
        for day in WEEKDAYS {
            assert_eq!(parse_day_name(day_name(day)), Some(day));
        }
        assert_eq!(parse_day_name("friday"), Some(Weekday::Fri));
        assert_eq!(parse_day_name("Funday"), None);
        assert_eq!(month_name(2), "February");
    }

    #[test]
    fn test_channel_stats_from_records() {
        let mut gained = VideoRecord::new("a", "t", at(2024, 1, 1, 9), 100, 0, 0);
        gained.subscribers_gained = Some(7);
        let records = RecordSet::new(vec![
            gained,
            VideoRecord::new("b", "t", at(2024, 1, 2, 9), 50, 0, 0),
        ])
        .unwrap();

        let stats = ChannelStats::from_records("local", "My Channel", &records, Utc::now());
        assert_eq!(stats.total_videos, 2);
        assert_eq!(stats.total_views, 150);
        assert_eq!(stats.total_subscribers, 7);
    }
}
