//! Channel-level totals, averages and rankings.
//!
//! Nothing here needs a minimum amount of data: an empty [`RecordSet`]
//! produces an all-zero [`MetricSummary`] and empty rankings.

use super::stats::{mean, median, quantile, sample_std};
use super::temporal::performance_by_day;
use super::Analysis;
use crate::types::{day_name, month_name, RecordSet, VideoRecord};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Channel-wide aggregates.
///
/// Optional counters (impressions, subscribers, watch time) contribute 0 when
/// a record lacks them. `avg_ctr` averages only records that carry a CTR.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub total_videos: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    /// Mean of per-video engagement rates
    pub avg_engagement_rate: f64,
    pub total_watch_time_hours: f64,
    /// Mean CTR percentage
    pub avg_ctr: f64,
    /// True when `avg_ctr` derives from synthesized impressions
    pub ctr_estimated: bool,
    pub total_impressions: u64,
    pub total_subscribers: u64,
    pub avg_subscribers: f64,
}

/// Compute the channel summary.
pub fn summarize(records: &RecordSet) -> MetricSummary {
    if records.is_empty() {
        return MetricSummary::default();
    }

    let n = records.len() as f64;
    let total_views: u64 = records.iter().map(|r| r.views).sum();
    let total_likes: u64 = records.iter().map(|r| r.likes).sum();
    let total_comments: u64 = records.iter().map(|r| r.comments).sum();
    let total_subscribers: u64 = records.iter().filter_map(|r| r.subscribers_gained).sum();

    let engagement: Vec<f64> = records.iter().map(VideoRecord::engagement_rate).collect();
    let ctrs: Vec<f64> = records.iter().filter_map(VideoRecord::ctr_proxy).collect();

    MetricSummary {
        total_videos: records.len(),
        total_views,
        total_likes,
        total_comments,
        avg_views: total_views as f64 / n,
        avg_likes: total_likes as f64 / n,
        avg_comments: total_comments as f64 / n,
        avg_engagement_rate: mean(&engagement),
        total_watch_time_hours: records.iter().filter_map(|r| r.watch_time_hours).sum(),
        avg_ctr: mean(&ctrs),
        ctr_estimated: records.has_estimated_reach(),
        total_impressions: records.iter().filter_map(|r| r.impressions).sum(),
        total_subscribers,
        avg_subscribers: total_subscribers as f64 / n,
    }
}

// ============================================
// Rankings
// ============================================

/// Metric used to rank videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMetric {
    #[default]
    Views,
    Likes,
    Comments,
    EngagementRate,
}

impl SortMetric {
    fn value(&self, record: &VideoRecord) -> f64 {
        match self {
            SortMetric::Views => record.views as f64,
            SortMetric::Likes => record.likes as f64,
            SortMetric::Comments => record.comments as f64,
            SortMetric::EngagementRate => record.engagement_rate(),
        }
    }
}

impl std::str::FromStr for SortMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "views" => Ok(SortMetric::Views),
            "likes" => Ok(SortMetric::Likes),
            "comments" => Ok(SortMetric::Comments),
            "engagement" | "engagement_rate" => Ok(SortMetric::EngagementRate),
            _ => Err(format!("unknown sort metric: {}", s)),
        }
    }
}

/// A video as it appears in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVideo {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub engagement_rate: f64,
}

impl From<&VideoRecord> for RankedVideo {
    fn from(record: &VideoRecord) -> Self {
        Self {
            video_id: record.video_id.clone(),
            title: record.title.clone(),
            published_at: record.published_at.to_rfc3339(),
            views: record.views,
            likes: record.likes,
            comments: record.comments,
            engagement_rate: record.engagement_rate(),
        }
    }
}

/// Best `n` videos by `metric`; ties keep chronological order.
pub fn top_videos(records: &RecordSet, n: usize, metric: SortMetric) -> Vec<RankedVideo> {
    let mut ranked: Vec<&VideoRecord> = records.iter().collect();
    ranked.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));
    ranked.into_iter().take(n).map(RankedVideo::from).collect()
}

/// Worst `n` videos by `metric`; ties keep chronological order.
pub fn worst_videos(records: &RecordSet, n: usize, metric: SortMetric) -> Vec<RankedVideo> {
    let mut ranked: Vec<&VideoRecord> = records.iter().collect();
    ranked.sort_by(|a, b| metric.value(a).total_cmp(&metric.value(b)));
    ranked.into_iter().take(n).map(RankedVideo::from).collect()
}

// ============================================
// Monthly and per-video rates
// ============================================

/// Aggregates for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    /// e.g. "March 2024"
    pub label: String,
    pub video_count: usize,
    pub total_views: u64,
    pub avg_views: f64,
    pub total_likes: u64,
    pub avg_likes: f64,
    pub total_comments: u64,
    pub avg_comments: f64,
    pub avg_engagement: f64,
}

/// Per-month aggregates in chronological order.
pub fn monthly_stats(records: &RecordSet) -> Vec<MonthlyStats> {
    let mut by_month: BTreeMap<(i32, u32), Vec<&VideoRecord>> = BTreeMap::new();
    for record in records {
        let date = record.publish_date();
        by_month
            .entry((date.year(), date.month()))
            .or_default()
            .push(record);
    }

    by_month
        .into_iter()
        .map(|((year, month), videos)| {
            let n = videos.len() as f64;
            let total_views: u64 = videos.iter().map(|r| r.views).sum();
            let total_likes: u64 = videos.iter().map(|r| r.likes).sum();
            let total_comments: u64 = videos.iter().map(|r| r.comments).sum();
            let engagement: Vec<f64> = videos.iter().map(|r| r.engagement_rate()).collect();
            MonthlyStats {
                year,
                month,
                label: format!("{} {}", month_name(month), year),
                video_count: videos.len(),
                total_views,
                avg_views: total_views as f64 / n,
                total_likes,
                avg_likes: total_likes as f64 / n,
                total_comments,
                avg_comments: total_comments as f64 / n,
                avg_engagement: mean(&engagement),
            }
        })
        .collect()
}

/// Views accumulated per day since publication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoVelocity {
    pub video_id: String,
    pub title: String,
    pub days_since_published: i64,
    pub views: u64,
    pub views_per_day: f64,
}

/// Views per day live as of `now`, fastest first.
pub fn video_velocity(records: &RecordSet, now: DateTime<Utc>) -> Vec<VideoVelocity> {
    let mut velocity: Vec<VideoVelocity> = records
        .iter()
        .map(|record| {
            let days = record.days_live(now);
            VideoVelocity {
                video_id: record.video_id.clone(),
                title: record.title.clone(),
                days_since_published: days,
                views: record.views,
                views_per_day: record.views as f64 / days as f64,
            }
        })
        .collect();
    velocity.sort_by(|a, b| b.views_per_day.total_cmp(&a.views_per_day));
    velocity
}

// ============================================
// Distribution and tiers
// ============================================

/// Spread of per-video engagement rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementDistribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation
    pub std: f64,
    pub q25: f64,
    pub q75: f64,
}

pub fn engagement_distribution(records: &RecordSet) -> Analysis<EngagementDistribution> {
    if records.is_empty() {
        return Analysis::insufficient("No videos to measure engagement spread");
    }
    let rates: Vec<f64> = records.iter().map(VideoRecord::engagement_rate).collect();
    Analysis::ready(EngagementDistribution {
        min: rates.iter().copied().fold(f64::INFINITY, f64::min),
        max: rates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: mean(&rates),
        median: median(&rates),
        std: sample_std(&rates),
        q25: quantile(&rates, 0.25),
        q75: quantile(&rates, 0.75),
    })
}

/// One band of the views distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierBand {
    pub min_views: u64,
    pub count: usize,
    pub description: &'static str,
}

/// Videos split at the 25th/50th/75th view percentiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceTiers {
    pub viral: TierBand,
    pub good: TierBand,
    pub average: TierBand,
    pub low: TierBand,
}

pub fn performance_tiers(records: &RecordSet) -> Analysis<PerformanceTiers> {
    if records.is_empty() {
        return Analysis::insufficient("No videos to tier");
    }
    let views: Vec<f64> = records.iter().map(|r| r.views as f64).collect();
    let q75 = quantile(&views, 0.75);
    let q50 = quantile(&views, 0.50);
    let q25 = quantile(&views, 0.25);
    let count = |pred: &dyn Fn(f64) -> bool| views.iter().filter(|v| pred(**v)).count();

    Analysis::ready(PerformanceTiers {
        viral: TierBand {
            min_views: q75 as u64,
            count: count(&|v| v >= q75),
            description: "Top 25% by views",
        },
        good: TierBand {
            min_views: q50 as u64,
            count: count(&|v| v >= q50 && v < q75),
            description: "50-75% by views",
        },
        average: TierBand {
            min_views: q25 as u64,
            count: count(&|v| v >= q25 && v < q50),
            description: "25-50% by views",
        },
        low: TierBand {
            min_views: 0,
            count: count(&|v| v < q25),
            description: "Bottom 25% by views",
        },
    })
}

/// Category of a content gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    Day,
    Engagement,
}

/// A weak spot worth attention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentGap {
    pub kind: GapKind,
    pub description: String,
    pub recommendation: String,
}

/// Weakest weekday and the low-engagement tail.
pub fn content_gaps(records: &RecordSet) -> Vec<ContentGap> {
    let mut gaps = Vec::new();

    let days = performance_by_day(records);
    if let Some(worst) = days
        .iter()
        .min_by(|a, b| a.stats.avg_views.total_cmp(&b.stats.avg_views))
    {
        let day = day_name(worst.day);
        gaps.push(ContentGap {
            kind: GapKind::Day,
            description: format!("Lowest views on {}", day),
            recommendation: format!("Consider posting more content on {}", day),
        });
    }

    if !records.is_empty() {
        let rates: Vec<f64> = records.iter().map(VideoRecord::engagement_rate).collect();
        let q25 = quantile(&rates, 0.25);
        let low = rates.iter().filter(|r| **r < q25).count();
        if low > 0 {
            gaps.push(ContentGap {
                kind: GapKind::Engagement,
                description: format!("{} videos have below-average engagement", low),
                recommendation: "Review low-engagement videos for content improvement"
                    .to_string(),
            });
        }
    }

    gaps
}
