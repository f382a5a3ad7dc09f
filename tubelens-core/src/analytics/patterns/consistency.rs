//! Upload cadence and bucketed performance patterns.

use super::long_word_counts;
use crate::analytics::stats::{mean, median, population_std, quantile, round2};
use crate::analytics::Analysis;
use crate::types::{RecordSet, VideoRecord};
use serde::Serialize;

// ============================================
// Upload consistency
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConsistencyLevel {
    #[serde(rename = "Very Consistent")]
    VeryConsistent,
    #[serde(rename = "Moderately Consistent")]
    ModeratelyConsistent,
    Inconsistent,
}

impl ConsistencyLevel {
    /// std < 2 days → Very, < 5 → Moderately, else Inconsistent.
    pub fn from_std(std_gap: f64) -> Self {
        if std_gap < 2.0 {
            ConsistencyLevel::VeryConsistent
        } else if std_gap < 5.0 {
            ConsistencyLevel::ModeratelyConsistent
        } else {
            ConsistencyLevel::Inconsistent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::VeryConsistent => "Very Consistent",
            ConsistencyLevel::ModeratelyConsistent => "Moderately Consistent",
            ConsistencyLevel::Inconsistent => "Inconsistent",
        }
    }
}

/// Regularity of the gaps between consecutive uploads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadConsistency {
    pub avg_days_between_uploads: f64,
    /// Population std of the day gaps
    pub std_days_between_uploads: f64,
    pub consistency: ConsistencyLevel,
    pub recommendation: String,
}

pub fn upload_consistency(records: &RecordSet) -> Analysis<UploadConsistency> {
    if records.len() < 2 {
        return Analysis::insufficient("Need at least 2 videos to measure upload gaps");
    }

    // Whole days between instants; never negative on a sorted set
    let gaps: Vec<f64> = records
        .as_slice()
        .windows(2)
        .map(|pair| (pair[1].published_at - pair[0].published_at).num_days() as f64)
        .collect();
    let avg_gap = mean(&gaps);
    let std_gap = population_std(&gaps);

    let recommendation = if avg_gap <= 3.0 {
        "Excellent consistency! Keep up the regular upload schedule."
    } else if avg_gap <= 7.0 {
        "Good consistency. Try to maintain a more regular schedule."
    } else {
        "Inconsistent uploads. Consider creating a content calendar."
    };

    Analysis::ready(UploadConsistency {
        avg_days_between_uploads: round2(avg_gap),
        std_days_between_uploads: round2(std_gap),
        consistency: ConsistencyLevel::from_std(std_gap),
        recommendation: recommendation.to_string(),
    })
}

// ============================================
// Duration and title length buckets
// ============================================

const DURATION_BUCKETS: &[(&str, u32, u32)] = &[
    ("Short (< 5 min)", 0, 300),
    ("Medium (5-15 min)", 300, 900),
    ("Long (15-30 min)", 900, 1800),
    ("Very Long (> 30 min)", 1800, u32::MAX),
];

const TITLE_LENGTH_BUCKETS: &[(&str, usize, usize)] = &[
    ("Very Short (< 30)", 0, 30),
    ("Short (30-50)", 30, 50),
    ("Medium (50-70)", 50, 70),
    ("Long (70-90)", 70, 90),
    ("Very Long (> 90)", 90, usize::MAX),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationBucket {
    pub label: &'static str,
    pub count: usize,
    pub avg_views: f64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationPatterns {
    pub buckets: Vec<DurationBucket>,
}

/// Mean views and engagement by video length. Empty buckets are omitted.
pub fn duration_patterns(records: &RecordSet) -> Analysis<DurationPatterns> {
    let timed: Vec<(u32, &VideoRecord)> = records
        .iter()
        .filter_map(|r| r.duration_seconds.map(|d| (d, r)))
        .collect();
    if timed.is_empty() {
        return Analysis::insufficient("Duration data not available");
    }

    let buckets = DURATION_BUCKETS
        .iter()
        .filter_map(|&(label, min, max)| {
            let members: Vec<&VideoRecord> = timed
                .iter()
                .filter(|(d, _)| *d >= min && *d < max)
                .map(|(_, r)| *r)
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(DurationBucket {
                label,
                count: members.len(),
                avg_views: mean(&members.iter().map(|r| r.views as f64).collect::<Vec<_>>())
                    .floor(),
                avg_engagement: round2(mean(
                    &members.iter().map(|r| r.engagement_rate()).collect::<Vec<_>>(),
                )),
            })
        })
        .collect();

    Analysis::ready(DurationPatterns { buckets })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleLengthBucket {
    pub label: &'static str,
    pub count: usize,
    pub avg_views: f64,
    /// Mean CTR (measured or proxy) of members that have one
    pub avg_ctr: Option<f64>,
}

/// Mean views and CTR by title length in characters.
pub fn title_length_patterns(records: &RecordSet) -> Vec<TitleLengthBucket> {
    TITLE_LENGTH_BUCKETS
        .iter()
        .filter_map(|&(label, min, max)| {
            let members: Vec<&VideoRecord> = records
                .iter()
                .filter(|r| {
                    let len = r.title_len();
                    len >= min && len < max
                })
                .collect();
            if members.is_empty() {
                return None;
            }
            let ctrs: Vec<f64> = members.iter().filter_map(|r| r.ctr_proxy()).collect();
            Some(TitleLengthBucket {
                label,
                count: members.len(),
                avg_views: mean(&members.iter().map(|r| r.views as f64).collect::<Vec<_>>())
                    .floor(),
                avg_ctr: (!ctrs.is_empty()).then(|| round2(mean(&ctrs))),
            })
        })
        .collect()
}

// ============================================
// Engagement split
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementGroup {
    pub count: usize,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub avg_comments: f64,
}

impl EngagementGroup {
    fn of(members: &[&VideoRecord]) -> Self {
        let avg = |f: fn(&VideoRecord) -> u64| {
            mean(&members.iter().map(|r| f(r) as f64).collect::<Vec<_>>()).floor()
        };
        Self {
            count: members.len(),
            avg_views: avg(|r| r.views),
            avg_likes: avg(|r| r.likes),
            avg_comments: avg(|r| r.comments),
        }
    }
}

/// Videos split at the median engagement rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementPatterns {
    /// Engagement at or above the median
    pub high_engagement: EngagementGroup,
    pub low_engagement: EngagementGroup,
    pub insight: String,
}

pub fn engagement_patterns(records: &RecordSet) -> Analysis<EngagementPatterns> {
    if records.is_empty() {
        return Analysis::insufficient("No data available");
    }

    let rates: Vec<f64> = records.iter().map(VideoRecord::engagement_rate).collect();
    let median_rate = median(&rates);
    let (high, low): (Vec<&VideoRecord>, Vec<&VideoRecord>) = records
        .iter()
        .partition(|r| r.engagement_rate() >= median_rate);

    let high = EngagementGroup::of(&high);
    let low = EngagementGroup::of(&low);
    let lift = (high.avg_views / low.avg_views.max(1.0) - 1.0) * 100.0;

    Analysis::ready(EngagementPatterns {
        insight: format!(
            "High engagement videos get {:.1}% more views on average",
            lift
        ),
        high_engagement: high,
        low_engagement: low,
    })
}

// ============================================
// Winning patterns
// ============================================

/// What the top 20% of videos by views have in common.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinningPatterns {
    /// 80th percentile of views
    pub threshold_views: f64,
    pub top_performer_count: usize,
    pub avg_title_length: f64,
    /// Up to 10 most frequent 4+ character words, most frequent first
    pub common_words: Vec<String>,
}

pub fn winning_patterns(records: &RecordSet) -> Analysis<WinningPatterns> {
    if records.is_empty() {
        return Analysis::insufficient("No data available");
    }

    let views: Vec<f64> = records.iter().map(|r| r.views as f64).collect();
    let threshold = quantile(&views, 0.8);
    let top: Vec<&VideoRecord> = records
        .iter()
        .filter(|r| r.views as f64 >= threshold)
        .collect();

    let mut counts = long_word_counts(top.iter().map(|r| r.title.as_str()));
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    Analysis::ready(WinningPatterns {
        threshold_views: threshold,
        top_performer_count: top.len(),
        avg_title_length: mean(&top.iter().map(|r| r.title_len() as f64).collect::<Vec<_>>())
            .floor(),
        common_words: counts.into_iter().take(10).map(|(w, _)| w).collect(),
    })
}
