//! Day-of-week and hour-of-day performance.
//!
//! Buckets exist only for weekdays / hours that have at least one video;
//! empty buckets are omitted, never filled with zeros. Day tables are always
//! in calendar order (Monday first), hour tables in ascending hour.

use super::stats::mean;
use super::timezone::TimezoneLabel;
use super::Analysis;
use crate::format::format_hour_ampm;
use crate::types::{day_name, RecordSet, VideoRecord, WEEKDAYS};
use chrono::Weekday;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates for one bucket of videos.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketStats {
    pub avg_views: f64,
    pub total_views: u64,
    pub video_count: usize,
    pub avg_engagement: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
}

impl BucketStats {
    fn from_videos(videos: &[&VideoRecord]) -> Self {
        let n = videos.len() as f64;
        if videos.is_empty() {
            return Self::default();
        }
        let total_views: u64 = videos.iter().map(|r| r.views).sum();
        let engagement: Vec<f64> = videos.iter().map(|r| r.engagement_rate()).collect();
        Self {
            avg_views: total_views as f64 / n,
            total_views,
            video_count: videos.len(),
            avg_engagement: mean(&engagement),
            avg_likes: videos.iter().map(|r| r.likes as f64).sum::<f64>() / n,
            avg_comments: videos.iter().map(|r| r.comments as f64).sum::<f64>() / n,
        }
    }
}

/// Stats for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    #[serde(with = "crate::types::weekday_name")]
    pub day: Weekday,
    #[serde(flatten)]
    pub stats: BucketStats,
}

/// Stats for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourBucket {
    pub hour: u32,
    #[serde(flatten)]
    pub stats: BucketStats,
}

/// Per-weekday stats, Monday→Sunday, skipping days with no uploads.
pub fn performance_by_day(records: &RecordSet) -> Vec<DayBucket> {
    WEEKDAYS
        .iter()
        .filter_map(|day| {
            let videos: Vec<&VideoRecord> =
                records.iter().filter(|r| r.day_of_week() == *day).collect();
            (!videos.is_empty()).then(|| DayBucket {
                day: *day,
                stats: BucketStats::from_videos(&videos),
            })
        })
        .collect()
}

/// Per-hour stats in ascending hour, skipping hours with no uploads.
pub fn performance_by_hour(records: &RecordSet) -> Vec<HourBucket> {
    let mut by_hour: BTreeMap<u32, Vec<&VideoRecord>> = BTreeMap::new();
    for record in records {
        by_hour.entry(record.hour()).or_default().push(record);
    }
    by_hour
        .into_iter()
        .map(|(hour, videos)| HourBucket {
            hour,
            stats: BucketStats::from_videos(&videos),
        })
        .collect()
}

/// First bucket holding the maximum of `key` (earliest on ties).
fn first_max<T>(buckets: &[T], key: impl Fn(&T) -> f64) -> Option<&T> {
    buckets.iter().fold(None, |best, bucket| match best {
        Some(b) if key(bucket) <= key(b) => Some(b),
        _ => Some(bucket),
    })
}

/// Whether a caller should flag results as statistically weak.
///
/// Analyzers still compute on thin data; this is a reporting policy.
pub fn is_statistically_weak(records: &RecordSet, threshold: usize) -> bool {
    records.len() < threshold
}

// ============================================
// Best day
// ============================================

/// Weekday performance with the winning days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAnalysis {
    pub daily_stats: Vec<DayBucket>,
    #[serde(with = "crate::types::weekday_name")]
    pub best_day_for_views: Weekday,
    #[serde(with = "crate::types::weekday_name")]
    pub best_day_for_engagement: Weekday,
    pub recommendation: String,
}

pub fn analyze_best_days(records: &RecordSet) -> Analysis<DayAnalysis> {
    let daily_stats = performance_by_day(records);
    let (Some(by_views), Some(by_engagement)) = (
        first_max(&daily_stats, |b| b.stats.avg_views),
        first_max(&daily_stats, |b| b.stats.avg_engagement),
    ) else {
        return Analysis::insufficient("No data available");
    };

    let best_day_for_views = by_views.day;
    let best_day_for_engagement = by_engagement.day;
    let recommendation = day_recommendation(&daily_stats, best_day_for_views);

    Analysis::ready(DayAnalysis {
        daily_stats,
        best_day_for_views,
        best_day_for_engagement,
        recommendation,
    })
}

fn day_recommendation(daily_stats: &[DayBucket], best_day: Weekday) -> String {
    let is_weekend = |day: Weekday| matches!(day, Weekday::Sat | Weekday::Sun);
    let avg_of = |weekend: bool| -> Option<f64> {
        let values: Vec<f64> = daily_stats
            .iter()
            .filter(|b| is_weekend(b.day) == weekend)
            .map(|b| b.stats.avg_views)
            .collect();
        (!values.is_empty()).then(|| mean(&values))
    };

    let weekends_win = match (avg_of(true), avg_of(false)) {
        (Some(weekend), Some(weekday)) => weekend > weekday,
        (Some(_), None) => true,
        _ => false,
    };

    if weekends_win {
        format!(
            "Best day: {}. Weekends perform better than weekdays.",
            day_name(best_day)
        )
    } else {
        format!(
            "Best day: {}. Weekdays perform better than weekends.",
            day_name(best_day)
        )
    }
}

// ============================================
// Best hour
// ============================================

/// Hourly performance with the winning hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourAnalysis {
    pub hourly_stats: Vec<HourBucket>,
    pub best_hour_for_views: u32,
    pub best_hour_for_engagement: u32,
    /// Up to three hours ranked by mean views
    pub top_3_hours: Vec<u32>,
    #[serde(flatten)]
    pub timezone: TimezoneLabel,
    pub recommendation: String,
}

pub fn analyze_best_hours(records: &RecordSet, timezone: &TimezoneLabel) -> Analysis<HourAnalysis> {
    let hourly_stats = performance_by_hour(records);
    let (Some(by_views), Some(by_engagement)) = (
        first_max(&hourly_stats, |b| b.stats.avg_views),
        first_max(&hourly_stats, |b| b.stats.avg_engagement),
    ) else {
        return Analysis::insufficient("No data available");
    };
    let best_hour_for_views = by_views.hour;
    let best_hour_for_engagement = by_engagement.hour;

    let mut ranked: Vec<&HourBucket> = hourly_stats.iter().collect();
    ranked.sort_by(|a, b| b.stats.avg_views.total_cmp(&a.stats.avg_views));
    let top_3_hours: Vec<u32> = ranked.iter().take(3).map(|b| b.hour).collect();

    let top_formatted: Vec<String> = top_3_hours.iter().map(|h| format_hour_ampm(*h)).collect();
    let recommendation = format!(
        "Best time: {} ({}). Top 3 times: {}",
        format_hour_ampm(best_hour_for_views),
        timezone.timezone_display,
        top_formatted.join(", ")
    );

    Analysis::ready(HourAnalysis {
        hourly_stats,
        best_hour_for_views,
        best_hour_for_engagement,
        top_3_hours,
        timezone: timezone.clone(),
        recommendation,
    })
}
