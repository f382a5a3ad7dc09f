//! Forward-looking posting plan.
//!
//! The calendar composes the temporal analyzer (which weekdays, which hour)
//! with the channel's best title patterns (what to call the video). The
//! weekday → content type mapping is a fixed editorial table, not derived
//! from data.
//!
//! Times are labelled with the channel's timezone but never converted: the
//! hour is whatever offset the records were stored in.

use super::stats::{mean, pearson, quantile, round2};
use super::temporal::{
    analyze_best_days, analyze_best_hours, performance_by_day, performance_by_hour, DayAnalysis,
    HourAnalysis,
};
use super::timezone::TimezoneLabel;
use super::Analysis;
use crate::format::format_hour_ampm;
use crate::types::{day_name, month_name, RecordSet, VideoRecord, WEEKDAYS};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Hour used when no hourly data exists.
const DEFAULT_HOUR: u32 = 14;

// ============================================
// Content types
// ============================================

/// Editorial archetype suggested for a weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentType {
    Educational,
    Tutorial,
    List,
    Reaction,
    #[serde(rename = "Behind the Scenes")]
    BehindTheScenes,
    Entertainment,
    #[serde(rename = "Q&A")]
    QAndA,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Educational => "Educational",
            ContentType::Tutorial => "Tutorial",
            ContentType::List => "List",
            ContentType::Reaction => "Reaction",
            ContentType::BehindTheScenes => "Behind the Scenes",
            ContentType::Entertainment => "Entertainment",
            ContentType::QAndA => "Q&A",
        }
    }

    /// Title templates; types without their own fall back to Educational.
    fn templates(&self) -> &'static [&'static str] {
        match self {
            ContentType::Tutorial => &[
                "Complete Tutorial: [Topic] from Start to Finish",
                "Beginner's Guide to [Topic] in [Number] Minutes",
                "How to Master [Skill] - Full Tutorial",
            ],
            ContentType::Entertainment => &[
                "[Challenge/Event] Gone Wrong - [Reaction]",
                "I Tried [Trend] for [Time] - Here's What Happened",
                "[Number] [Things/Moments] That [Shock Audience]",
            ],
            ContentType::List => &[
                "Top [Number] [Topic] You Need to See",
                "Best [Topic] of [Year] - Ultimate Ranking",
                "[Number] [Secrets/Tips] Nobody Tells You About [Topic]",
            ],
            ContentType::QAndA => &[
                "Answering Your Questions About [Topic]",
                "You Asked, I Answered - [Number] Questions",
                "[Common Question] - My Answer After [Time]",
            ],
            ContentType::Educational | ContentType::Reaction | ContentType::BehindTheScenes => &[
                "How to [Achieve Result] - {pattern}",
                "Why [Audience] [Struggle] - Complete Guide",
                "[Number] Things [Audience] Should Know About [Topic]",
            ],
        }
    }
}

/// What to post on a weekday and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentSuggestion {
    pub content_type: ContentType,
    pub description: &'static str,
    pub reason: &'static str,
    pub example: &'static str,
}

/// Fixed weekday → content archetype lookup.
pub fn content_type_for(day: Weekday) -> ContentSuggestion {
    let (content_type, description, reason, example) = match day {
        Weekday::Mon => (
            ContentType::Educational,
            "Start the week with value - teach something useful",
            "Audiences are in work mode and looking to learn",
            "How-to videos, tutorials, educational content",
        ),
        Weekday::Tue => (
            ContentType::Tutorial,
            "Step-by-step guides and how-tos",
            "Tutorials perform well early in the week",
            "Complete guides, step-by-step tutorials",
        ),
        Weekday::Wed => (
            ContentType::List,
            "Top lists, rankings, or compilations",
            "Mid-week engagement peaks with list content",
            "Top 10, rankings, best of lists",
        ),
        Weekday::Thu => (
            ContentType::Reaction,
            "React to trends, share opinions",
            "Builds anticipation for the weekend",
            "React to news, trending topics, opinions",
        ),
        Weekday::Fri => (
            ContentType::BehindTheScenes,
            "Vlogs, BTS, personal content",
            "Weekend vibes start, more casual content works",
            "Day in life, vlogs, behind the scenes",
        ),
        Weekday::Sat => (
            ContentType::Entertainment,
            "Fun content, challenges, lifestyle",
            "Highest engagement - people have free time",
            "Challenges, lifestyle, fun content",
        ),
        Weekday::Sun => (
            ContentType::QAndA,
            "Answer fan questions, community content",
            "End of week - connect with your audience",
            "Q&A, community requests, fan interactions",
        ),
    };
    ContentSuggestion {
        content_type,
        description,
        reason,
        example,
    }
}

/// First title template for a content type, filled with the top pattern.
pub fn title_suggestion(content_type: ContentType, patterns: &BestTitlePatterns) -> String {
    let pattern = patterns
        .best_patterns
        .first()
        .map(String::as_str)
        .unwrap_or("Step by Step");
    content_type.templates()[0].replace("{pattern}", pattern)
}

// ============================================
// Title patterns of top performers
// ============================================

/// Lexical markers counted in top-performer titles, in report order.
const TITLE_MARKERS: &[(&str, &[&str])] = &[
    ("How To", &["how to", "how-to"]),
    ("Top List", &["top", "ranking"]),
    ("Best", &["best"]),
    ("Review", &["review"]),
    ("Tutorial", &["tutorial", "guide"]),
    ("Vs", &[" vs ", "versus"]),
    ("Secret", &["secret"]),
    ("Why", &["why"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternCount {
    pub pattern: &'static str,
    pub count: usize,
}

/// Which title habits the top 20% of videos share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestTitlePatterns {
    /// Up to five most frequent markers
    pub best_patterns: Vec<String>,
    pub avg_title_length: f64,
    /// Digits in more than 30% of top titles
    pub use_numbers: bool,
    /// Question marks in more than 20% of top titles
    pub use_questions: bool,
    pub pattern_counts: Vec<PatternCount>,
    /// True when too few top performers existed and defaults were returned
    pub defaulted: bool,
}

impl BestTitlePatterns {
    fn defaults() -> Self {
        Self {
            best_patterns: ["How to", "Top", "Best", "Review", "Tutorial"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            avg_title_length: 50.0,
            use_numbers: true,
            use_questions: true,
            pattern_counts: Vec::new(),
            defaulted: true,
        }
    }
}

/// Title markers of videos at or above the 80th percentile of views.
///
/// Fewer than 3 such videos yields generic defaults.
pub fn best_title_patterns(records: &RecordSet) -> BestTitlePatterns {
    let views: Vec<f64> = records.iter().map(|r| r.views as f64).collect();
    let threshold = quantile(&views, 0.8);
    let top: Vec<&VideoRecord> = records
        .iter()
        .filter(|r| r.views as f64 >= threshold)
        .collect();
    if top.len() < 3 {
        return BestTitlePatterns::defaults();
    }

    let lowered: Vec<String> = top.iter().map(|r| r.title.to_lowercase()).collect();
    let mut counts: Vec<PatternCount> = TITLE_MARKERS
        .iter()
        .map(|&(pattern, needles)| PatternCount {
            pattern,
            count: lowered
                .iter()
                .filter(|t| needles.iter().any(|n| t.contains(n)))
                .count(),
        })
        .collect();
    let numbers = lowered.iter().filter(|t| DIGITS_RE.is_match(t)).count();
    let questions = top.iter().filter(|r| r.title.contains('?')).count();
    counts.push(PatternCount {
        pattern: "Numbers",
        count: numbers,
    });
    counts.push(PatternCount {
        pattern: "Questions",
        count: questions,
    });

    let mut ranked = counts.clone();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    let mut best_patterns: Vec<String> = ranked
        .iter()
        .take(5)
        .filter(|p| p.count > 0)
        .map(|p| p.pattern.to_string())
        .collect();
    if best_patterns.is_empty() {
        best_patterns = vec!["How to".into(), "Top".into(), "Best".into()];
    }

    let n = top.len() as f64;
    BestTitlePatterns {
        best_patterns,
        avg_title_length: mean(&top.iter().map(|r| r.title_len() as f64).collect::<Vec<_>>())
            .floor(),
        use_numbers: numbers as f64 > n * 0.3,
        use_questions: questions as f64 > n * 0.2,
        pattern_counts: counts,
        defaulted: false,
    }
}

// ============================================
// Calendar
// ============================================

/// One planned upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarSlot {
    /// 1-based week of the plan
    pub week: u32,
    pub date: NaiveDate,
    /// e.g. "March 04, 2024"
    pub date_formatted: String,
    #[serde(with = "crate::types::weekday_name")]
    pub day: Weekday,
    /// 12-hour label, e.g. "2:00 PM"
    pub time: String,
    pub time_24h: u32,
    #[serde(flatten)]
    pub timezone: TimezoneLabel,
    pub content_type: ContentType,
    pub content_description: &'static str,
    pub content_reason: &'static str,
    pub content_example: &'static str,
    pub title_suggestion: String,
    /// Top three title patterns
    pub title_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentCalendar {
    /// Weekdays chosen, by descending mean views
    #[serde(with = "crate::types::weekday_names")]
    pub posting_days: Vec<Weekday>,
    pub posting_hour: u32,
    pub slots: Vec<CalendarSlot>,
}

/// Plan `weeks` × `videos_per_week` uploads starting from `today`.
///
/// The posting days are the weekdays with the highest mean views (earlier
/// weekday on ties); one best hour is used for every slot. Slots are
/// ordered by date.
pub fn generate_calendar(
    records: &RecordSet,
    weeks: u32,
    videos_per_week: usize,
    today: NaiveDate,
    timezone: &TimezoneLabel,
) -> Analysis<ContentCalendar> {
    let mut days = performance_by_day(records);
    if days.is_empty() {
        return Analysis::insufficient("No data available");
    }
    // Stable: calendar order breaks ties
    days.sort_by(|a, b| b.stats.avg_views.total_cmp(&a.stats.avg_views));
    let posting_days: Vec<Weekday> = days.iter().take(videos_per_week).map(|b| b.day).collect();

    let posting_hour = performance_by_hour(records)
        .iter()
        .fold(None, |best: Option<(u32, f64)>, b| match best {
            Some((_, v)) if b.stats.avg_views <= v => best,
            _ => Some((b.hour, b.stats.avg_views)),
        })
        .map(|(hour, _)| hour)
        .unwrap_or(DEFAULT_HOUR);

    let patterns = best_title_patterns(records);
    let top_patterns: Vec<String> = patterns.best_patterns.iter().take(3).cloned().collect();

    let mut slots = Vec::new();
    for week in 0..weeks {
        let week_start = today + Duration::weeks(week as i64);
        for day in WEEKDAYS.iter().filter(|d| posting_days.contains(d)) {
            let date = next_on_or_after(week_start, *day);
            let suggestion = content_type_for(*day);
            slots.push(CalendarSlot {
                week: week + 1,
                date,
                date_formatted: date.format("%B %d, %Y").to_string(),
                day: *day,
                time: format_hour_ampm(posting_hour),
                time_24h: posting_hour,
                timezone: timezone.clone(),
                content_type: suggestion.content_type,
                content_description: suggestion.description,
                content_reason: suggestion.reason,
                content_example: suggestion.example,
                title_suggestion: title_suggestion(suggestion.content_type, &patterns),
                title_patterns: top_patterns.clone(),
            });
        }
    }
    slots.sort_by_key(|s| s.date);

    Analysis::ready(ContentCalendar {
        posting_days,
        posting_hour,
        slots,
    })
}

/// First date on or after `from` that falls on `day`.
fn next_on_or_after(from: NaiveDate, day: Weekday) -> NaiveDate {
    let ahead = (day.num_days_from_monday() + 7 - from.weekday().num_days_from_monday()) % 7;
    from + Duration::days(ahead as i64)
}

// ============================================
// Upload frequency
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadFrequency {
    /// Mean uploads per active ISO week
    pub current_avg_frequency: f64,
    pub recommended_frequency: u32,
    /// Correlation between weekly upload count and weekly mean views
    pub views_correlation: f64,
    pub weeks_observed: usize,
    pub recommendation: String,
}

/// Weekly upload volume and its relation to views.
///
/// Weeks are ISO (year, week) pairs; weeks without uploads are not counted.
pub fn analyze_upload_frequency(records: &RecordSet) -> Analysis<UploadFrequency> {
    let mut weeks: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for record in records {
        let iso = record.publish_date().iso_week();
        weeks
            .entry((iso.year(), iso.week()))
            .or_default()
            .push(record.views as f64);
    }
    if weeks.len() < 2 {
        return Analysis::insufficient("Not enough data for frequency analysis");
    }

    let counts: Vec<f64> = weeks.values().map(|v| v.len() as f64).collect();
    let mean_views: Vec<f64> = weeks.values().map(|v| mean(v)).collect();
    let avg = mean(&counts);

    let recommendation = if avg >= 5.0 {
        "High upload frequency. Focus on consistency and quality."
    } else if avg >= 3.0 {
        "Moderate frequency. Good balance for growth."
    } else if avg >= 1.0 {
        "Lower frequency. Focus on video quality over quantity."
    } else {
        "Consider increasing upload frequency for better growth."
    };

    Analysis::ready(UploadFrequency {
        current_avg_frequency: round2(avg),
        recommended_frequency: avg.round() as u32,
        views_correlation: if weeks.len() > 2 {
            round2(pearson(&mean_views, &counts))
        } else {
            0.0
        },
        weeks_observed: weeks.len(),
        recommendation: recommendation.to_string(),
    })
}

// ============================================
// Seasonality
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: u32,
    pub month_name: &'static str,
    pub avg_views: f64,
    pub video_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalAnalysis {
    /// Calendar months across all years, January first
    pub monthly_stats: Vec<MonthBucket>,
    pub best_month: &'static str,
    pub best_month_num: u32,
}

/// Mean views by calendar month, pooling years.
pub fn seasonal_patterns(records: &RecordSet) -> Analysis<SeasonalAnalysis> {
    let mut months: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for record in records {
        months
            .entry(record.published_at.month())
            .or_default()
            .push(record.views as f64);
    }

    let monthly_stats: Vec<MonthBucket> = months
        .into_iter()
        .map(|(month, views)| MonthBucket {
            month,
            month_name: month_name(month),
            avg_views: mean(&views),
            video_count: views.len(),
        })
        .collect();

    let best = monthly_stats.iter().fold(None::<&MonthBucket>, |best, m| match best {
        Some(b) if m.avg_views <= b.avg_views => Some(b),
        _ => Some(m),
    });
    let Some(best) = best else {
        return Analysis::insufficient("No data available");
    };
    let (best_month, best_month_num) = (best.month_name, best.month);

    Analysis::ready(SeasonalAnalysis {
        monthly_stats,
        best_month,
        best_month_num,
    })
}

// ============================================
// Bundle
// ============================================

/// Everything a scheduling view needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteRecommendations {
    pub best_days: Analysis<DayAnalysis>,
    pub best_hours: Analysis<HourAnalysis>,
    pub title_patterns: BestTitlePatterns,
    pub upload_frequency: Analysis<UploadFrequency>,
    pub seasonal_patterns: Analysis<SeasonalAnalysis>,
    #[serde(flatten)]
    pub timezone: TimezoneLabel,
}

pub fn complete_recommendations(
    records: &RecordSet,
    timezone: &TimezoneLabel,
) -> CompleteRecommendations {
    CompleteRecommendations {
        best_days: analyze_best_days(records),
        best_hours: analyze_best_hours(records, timezone),
        title_patterns: best_title_patterns(records),
        upload_frequency: analyze_upload_frequency(records),
        seasonal_patterns: seasonal_patterns(records),
        timezone: timezone.clone(),
    }
}

/// "Monday, Wednesday and Friday" style list of days.
pub fn describe_days(days: &[Weekday]) -> String {
    let names: Vec<&str> = days.iter().map(|d| day_name(*d)).collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
