//! Analytics over a channel's [`RecordSet`](crate::types::RecordSet).
//!
//! Every analyzer here is a pure function of its input records:
//!
//! - [`summary`]: channel totals, averages, rankings, tiers
//! - [`temporal`]: day-of-week and hour-of-day performance
//! - [`forecast`]: regression-based projections and growth trajectory
//! - [`patterns`]: title features, themes, upload consistency, thumbnails
//! - [`calendar`]: forward posting plan and cadence analysis
//! - [`ab_test`]: title and thumbnail A/B simulation
//! - [`report`]: all of the above composed into one [`ChannelReport`]
//!
//! Analyzers that need a minimum amount of data return [`Analysis`] rather
//! than an error, so callers can render a warning and keep going.

pub mod ab_test;
pub mod calendar;
pub mod forecast;
pub mod patterns;
pub mod regression;
pub mod report;
pub mod stats;
pub mod summary;
pub mod temporal;
pub mod timezone;

#[cfg(test)]
pub(crate) mod test_support;

pub use ab_test::{
    compare_thumbnail_bytes, compare_thumbnails, run_title_test, thumbnail_tips,
    title_improvement_tips, title_length_analysis, ThumbnailComparison, TitleLengthAnalysis,
    TitleLengthBin, TitleTestResult, TitleVerdict, Winner,
};
pub use calendar::{
    analyze_upload_frequency, best_title_patterns, complete_recommendations, content_type_for,
    describe_days, generate_calendar, seasonal_patterns, title_suggestion, BestTitlePatterns,
    CalendarSlot, CompleteRecommendations, ContentCalendar, ContentSuggestion, ContentType,
    MonthBucket, SeasonalAnalysis, UploadFrequency,
};
pub use forecast::{
    forecast, forecast_all, forecast_engagement, forecast_subscribers, forecast_views,
    growth_trajectory, ForecastBundle, ForecastMetric, ForecastPoint, ForecastResult,
    GrowthTrajectory, HistoricalPoint, Trend,
};
pub use patterns::{
    all_patterns, analyze_thumbnail, analyze_title_patterns, best_title_keywords,
    detect_content_themes, duration_patterns, engagement_patterns, simulate_title_change,
    title_length_patterns, upload_consistency, winning_patterns, Confidence, PatternReport,
    ThemeProfile, ThumbnailFeatures, TitleFeature, TitlePattern, TitleSimulation,
    UploadConsistency,
};
pub use regression::{FittedModel, ModelKind};
pub use report::{generate_report, ChannelReport, ReportOptions};
pub use summary::{
    content_gaps, engagement_distribution, monthly_stats, performance_tiers, summarize,
    top_videos, video_velocity, worst_videos, MetricSummary, RankedVideo, SortMetric,
};
pub use temporal::{
    analyze_best_days, analyze_best_hours, is_statistically_weak, performance_by_day,
    performance_by_hour, BucketStats, DayAnalysis, DayBucket, HourAnalysis, HourBucket,
};
pub use timezone::TimezoneLabel;

use serde::Serialize;

/// Outcome of an analysis that needs a minimum amount of data.
///
/// Thin data is an expected state, not a failure: it carries the reason so
/// callers can show it instead of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Analysis<T> {
    /// Enough data; the computed value
    Ready {
        #[serde(flatten)]
        value: T,
    },
    /// Not enough data to say anything meaningful
    Insufficient { reason: String },
}

impl<T> Analysis<T> {
    /// Wrap a computed value.
    pub fn ready(value: T) -> Self {
        Analysis::Ready { value }
    }

    /// Report insufficient data.
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Analysis::Insufficient {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Analysis::Ready { .. })
    }

    /// Borrow the value if there was enough data.
    pub fn value(&self) -> Option<&T> {
        match self {
            Analysis::Ready { value } => Some(value),
            Analysis::Insufficient { .. } => None,
        }
    }

    /// Take the value if there was enough data.
    pub fn into_value(self) -> Option<T> {
        match self {
            Analysis::Ready { value } => Some(value),
            Analysis::Insufficient { .. } => None,
        }
    }

    /// The reason data was insufficient, if it was.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Analysis::Ready { .. } => None,
            Analysis::Insufficient { reason } => Some(reason),
        }
    }

    /// Transform the ready value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Analysis<U> {
        match self {
            Analysis::Ready { value } => Analysis::Ready { value: f(value) },
            Analysis::Insufficient { reason } => Analysis::Insufficient { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize)]
    struct Sample {
        n: u32,
    }

    #[test]
    fn test_analysis_accessors() {
        let ready = Analysis::ready(Sample { n: 3 });
        assert!(ready.is_ready());
        assert_eq!(ready.value(), Some(&Sample { n: 3 }));
        assert_eq!(ready.reason(), None);

        let thin: Analysis<Sample> = Analysis::insufficient("need 2 days");
        assert!(!thin.is_ready());
        assert_eq!(thin.reason(), Some("need 2 days"));
        assert_eq!(thin.map(|s| s.n).into_value(), None);
    }

    #[test]
    fn test_analysis_serializes_tagged() {
        let ready = serde_json::to_value(Analysis::ready(Sample { n: 1 })).unwrap();
        assert_eq!(ready["status"], "ready");
        assert_eq!(ready["n"], 1);

        let thin = serde_json::to_value(Analysis::<Sample>::insufficient("empty")).unwrap();
        assert_eq!(thin["status"], "insufficient");
        assert_eq!(thin["reason"], "empty");
    }
}
