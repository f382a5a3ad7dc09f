//! Full channel report.
//!
//! Runs every analyzer over one [`RecordSet`] and collects the results into a
//! single serializable [`ChannelReport`]. This is the only place analytics
//! meet configuration: [`ReportOptions`] carries horizons, cadence and the
//! timezone label in from `[analytics]`.

use super::calendar::{
    complete_recommendations, generate_calendar, CompleteRecommendations, ContentCalendar,
};
use super::forecast::{forecast_all, ForecastBundle};
use super::patterns::{all_patterns, PatternReport};
use super::summary::{
    content_gaps, engagement_distribution, monthly_stats, performance_tiers, summarize,
    top_videos, video_velocity, worst_videos, ContentGap, EngagementDistribution, MetricSummary,
    MonthlyStats, PerformanceTiers, RankedVideo, SortMetric, VideoVelocity,
};
use super::temporal::is_statistically_weak;
use super::timezone::TimezoneLabel;
use super::Analysis;
use crate::config::AnalyticsConfig;
use crate::types::RecordSet;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Knobs for one report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub forecast_days: u32,
    pub calendar_weeks: u32,
    pub videos_per_week: u32,
    /// Configured zone name; `None` falls back to the records' own offset
    pub timezone: Option<String>,
    pub min_reliable_records: usize,
    pub top_n: usize,
    /// First day the calendar may schedule
    pub today: NaiveDate,
    /// Reference time for per-video velocity
    pub now: DateTime<Utc>,
}

impl ReportOptions {
    /// Options from config, anchored at `now`.
    pub fn from_config(config: &AnalyticsConfig, now: DateTime<Utc>) -> Self {
        Self {
            forecast_days: config.forecast_days,
            calendar_weeks: config.calendar_weeks,
            videos_per_week: config.videos_per_week,
            timezone: Some(config.timezone.clone()),
            min_reliable_records: config.min_reliable_records,
            top_n: config.top_n,
            today: now.date_naive(),
            now,
        }
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default(), Utc::now())
    }
}

/// Everything known about a channel at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelReport {
    pub generated_at: DateTime<Utc>,
    pub video_count: usize,
    /// Fewer videos than `min_reliable_records`; rankings may be noise
    pub statistically_weak: bool,
    /// Some impressions / CTR values were synthesized
    pub reach_estimated: bool,
    pub timezone: TimezoneLabel,
    pub summary: MetricSummary,
    pub top_videos: Vec<RankedVideo>,
    pub worst_videos: Vec<RankedVideo>,
    pub monthly: Vec<MonthlyStats>,
    pub velocity: Vec<VideoVelocity>,
    pub engagement_distribution: Analysis<EngagementDistribution>,
    pub performance_tiers: Analysis<PerformanceTiers>,
    pub content_gaps: Vec<ContentGap>,
    pub schedule: CompleteRecommendations,
    pub forecasts: ForecastBundle,
    pub patterns: PatternReport,
    pub calendar: Analysis<ContentCalendar>,
}

/// Run every analyzer and assemble the report.
pub fn generate_report(records: &RecordSet, options: &ReportOptions) -> ChannelReport {
    let timezone = TimezoneLabel::resolve(options.timezone.as_deref(), records);
    let statistically_weak = is_statistically_weak(records, options.min_reliable_records);

    tracing::info!(
        videos = records.len(),
        timezone = %timezone.timezone,
        statistically_weak,
        "Generating channel report"
    );

    let summary = summarize(records);
    let top = top_videos(records, options.top_n, SortMetric::Views);
    let worst = worst_videos(records, options.top_n, SortMetric::Views);
    tracing::debug!(total_views = summary.total_views, "Summary computed");

    let schedule = complete_recommendations(records, &timezone);
    tracing::debug!(
        best_days_ready = schedule.best_days.is_ready(),
        best_hours_ready = schedule.best_hours.is_ready(),
        "Schedule analysis computed"
    );

    let forecasts = forecast_all(records, options.forecast_days);
    if let Some(reason) = forecasts.views_forecast.reason() {
        tracing::debug!(reason, "Views forecast skipped");
    }

    let patterns = all_patterns(records, options.top_n.max(10));
    tracing::debug!(
        title_patterns = patterns.title_patterns.len(),
        themes = patterns.content_themes.len(),
        "Patterns computed"
    );

    let calendar = generate_calendar(
        records,
        options.calendar_weeks,
        options.videos_per_week as usize,
        options.today,
        &timezone,
    );

    ChannelReport {
        generated_at: options.now,
        video_count: records.len(),
        statistically_weak,
        reach_estimated: records.has_estimated_reach(),
        timezone,
        summary,
        top_videos: top,
        worst_videos: worst,
        monthly: monthly_stats(records),
        velocity: video_velocity(records, options.now),
        engagement_distribution: engagement_distribution(records),
        performance_tiers: performance_tiers(records),
        content_gaps: content_gaps(records),
        schedule,
        forecasts,
        patterns,
        calendar,
    }
}
