//! Trend forecasting over daily-aggregated series.
//!
//! Records are grouped by publish date, regressed against days elapsed since
//! the first date, and projected `days` ahead. The projection is advisory:
//!
//! - 10+ distinct days fit a second-degree polynomial, fewer a straight line
//! - predictions are clamped to `[max(0, 0.5 × min), 2 × max]` of the history
//! - the band is ±1.96 × population std of in-sample residuals
//!
//! Fewer than 2 distinct days yields [`Analysis::Insufficient`].

use super::regression::{fit_linear, fit_quadratic, FittedModel};
use super::stats::{mean, pct_change, population_std, safe_div};
use super::Analysis;
use crate::types::{RecordSet, VideoRecord};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Distinct days needed before the polynomial model is used.
pub const POLYNOMIAL_MIN_DAYS: usize = 10;

/// z-score of the symmetric 95% band.
const CONFIDENCE_Z: f64 = 1.96;

/// Series a forecast can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMetric {
    /// Views summed per day
    Views,
    /// Subscribers gained summed per day
    Subscribers,
    /// Engagement rate averaged per day, capped at 100%
    Engagement,
}

impl ForecastMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMetric::Views => "views",
            ForecastMetric::Subscribers => "subscribers",
            ForecastMetric::Engagement => "engagement",
        }
    }

    /// Daily series for this metric, oldest first.
    fn daily_series(&self, records: &RecordSet) -> Vec<(NaiveDate, f64)> {
        let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for record in records {
            if let Some(value) = self.value(record) {
                by_day.entry(record.publish_date()).or_default().push(value);
            }
        }
        by_day
            .into_iter()
            .map(|(date, values)| match self {
                ForecastMetric::Engagement => (date, mean(&values)),
                _ => (date, values.iter().sum()),
            })
            .collect()
    }

    fn value(&self, record: &VideoRecord) -> Option<f64> {
        match self {
            ForecastMetric::Views => Some(record.views as f64),
            ForecastMetric::Subscribers => record.subscribers_gained.map(|s| s as f64),
            ForecastMetric::Engagement => Some(record.engagement_rate()),
        }
    }
}

/// One projected day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    /// predicted − 1.96σ
    pub lower: f64,
    /// predicted + 1.96σ
    pub upper: f64,
}

/// One observed day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A projection of one metric. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub metric: ForecastMetric,
    pub horizon_days: u32,
    pub predictions: Vec<ForecastPoint>,
    pub model: FittedModel,
    /// Population std of in-sample residuals
    pub residual_std: f64,
    /// Clamp applied to every prediction
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Sum of predictions over the horizon
    pub total: f64,
    /// total / horizon_days
    pub daily_average: f64,
    /// Daily observations the model was fitted on
    pub historical: Vec<HistoricalPoint>,
}

/// Forecast `metric` for the next `days` days.
pub fn forecast(
    records: &RecordSet,
    metric: ForecastMetric,
    days: u32,
) -> Analysis<ForecastResult> {
    let series = metric.daily_series(records);
    if metric == ForecastMetric::Subscribers && series.is_empty() && !records.is_empty() {
        return Analysis::insufficient("Subscriber data not available");
    }
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Analysis::insufficient("Not enough data for forecasting");
    };
    if series.len() < 2 {
        return Analysis::insufficient("Not enough data for forecasting");
    }
    let (first_date, last_date) = (first.0, last.0);

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(date, value)| ((*date - first_date).num_days() as f64, *value))
        .collect();

    let model = if series.len() >= POLYNOMIAL_MIN_DAYS {
        fit_quadratic(&points).unwrap_or_else(|| fit_linear(&points))
    } else {
        fit_linear(&points)
    };
    let residual_std = population_std(&model.residuals(&points));

    let hist_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let hist_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let lower_bound = (hist_min * 0.5).max(0.0);
    let mut upper_bound = (hist_max * 2.0).max(lower_bound);
    if metric == ForecastMetric::Engagement {
        upper_bound = upper_bound.min(100.0).max(lower_bound);
    }

    let predictions: Vec<ForecastPoint> = (1..=days)
        .map(|offset| {
            let date = last_date + Duration::days(offset as i64);
            let x = (date - first_date).num_days() as f64;
            let predicted = model.predict(x).clamp(lower_bound, upper_bound).max(0.0);
            ForecastPoint {
                date,
                predicted,
                lower: predicted - CONFIDENCE_Z * residual_std,
                upper: predicted + CONFIDENCE_Z * residual_std,
            }
        })
        .collect();

    let total: f64 = predictions.iter().map(|p| p.predicted).sum();

    Analysis::ready(ForecastResult {
        metric,
        horizon_days: days,
        predictions,
        model,
        residual_std,
        lower_bound,
        upper_bound,
        total,
        daily_average: safe_div(total, days as f64),
        historical: series
            .into_iter()
            .map(|(date, value)| HistoricalPoint { date, value })
            .collect(),
    })
}

pub fn forecast_views(records: &RecordSet, days: u32) -> Analysis<ForecastResult> {
    forecast(records, ForecastMetric::Views, days)
}

pub fn forecast_subscribers(records: &RecordSet, days: u32) -> Analysis<ForecastResult> {
    forecast(records, ForecastMetric::Subscribers, days)
}

pub fn forecast_engagement(records: &RecordSet, days: u32) -> Analysis<ForecastResult> {
    forecast(records, ForecastMetric::Engagement, days)
}

// ============================================
// Growth trajectory
// ============================================

/// Direction of the views trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Growing,
    Declining,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Growing => "Growing",
            Trend::Declining => "Declining",
        }
    }
}

/// First half vs second half of the channel's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthTrajectory {
    pub views_growth_percentage: f64,
    pub engagement_growth_percentage: f64,
    pub trend: Trend,
    pub first_half_avg_views: f64,
    pub second_half_avg_views: f64,
    pub recommendation: String,
}

/// Compare mean views and engagement between the chronological halves.
///
/// Records are already in (published_at, video_id) order, so the split is
/// reproducible. With an odd count the second half holds the extra video.
pub fn growth_trajectory(records: &RecordSet) -> Analysis<GrowthTrajectory> {
    if records.len() < 2 {
        return Analysis::insufficient("Need at least 2 videos to compare growth");
    }
    let (first, second) = records.as_slice().split_at(records.len() / 2);

    let views =
        |half: &[VideoRecord]| mean(&half.iter().map(|r| r.views as f64).collect::<Vec<_>>());
    let engagement = |half: &[VideoRecord]| {
        mean(&half.iter().map(VideoRecord::engagement_rate).collect::<Vec<_>>())
    };

    let first_half_avg_views = views(first);
    let second_half_avg_views = views(second);
    let views_growth = pct_change(first_half_avg_views, second_half_avg_views);
    let engagement_growth = pct_change(engagement(first), engagement(second));

    Analysis::ready(GrowthTrajectory {
        views_growth_percentage: views_growth,
        engagement_growth_percentage: engagement_growth,
        trend: if views_growth > 0.0 {
            Trend::Growing
        } else {
            Trend::Declining
        },
        first_half_avg_views,
        second_half_avg_views,
        recommendation: growth_recommendation(views_growth, engagement_growth).to_string(),
    })
}

fn growth_recommendation(views_growth: f64, engagement_growth: f64) -> &'static str {
    let views = views_growth.partial_cmp(&0.0);
    let engagement = engagement_growth.partial_cmp(&0.0);
    match (views, engagement) {
        (Some(Ordering::Greater), Some(Ordering::Greater))
            if views_growth > 20.0 && engagement_growth > 10.0 =>
        {
            "Excellent growth! Continue current strategy."
        }
        (Some(Ordering::Greater), Some(Ordering::Greater)) => {
            "Moderate growth. Consider increasing upload frequency."
        }
        (Some(Ordering::Greater), Some(Ordering::Less)) => {
            "Views up but engagement down. Focus on content quality."
        }
        (Some(Ordering::Less), Some(Ordering::Greater)) => {
            "Fewer views but higher engagement. Content is resonating."
        }
        // Any flat axis counts as declining
        _ => "Declining performance. Review content strategy and posting schedule.",
    }
}

// ============================================
// Bundle
// ============================================

/// Every forecast plus the growth trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastBundle {
    pub views_forecast: Analysis<ForecastResult>,
    pub subscribers_forecast: Analysis<ForecastResult>,
    pub engagement_forecast: Analysis<ForecastResult>,
    pub growth_trajectory: Analysis<GrowthTrajectory>,
}

pub fn forecast_all(records: &RecordSet, days: u32) -> ForecastBundle {
    ForecastBundle {
        views_forecast: forecast_views(records, days),
        subscribers_forecast: forecast_subscribers(records, days),
        engagement_forecast: forecast_engagement(records, days),
        growth_trajectory: growth_trajectory(records),
    }
}
