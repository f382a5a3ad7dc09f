//! Recurring patterns in titles, topics, cadence and thumbnails.
//!
//! - [`features`]: boolean title features, their view lift, title-swap simulation
//! - [`themes`]: single-label keyword clustering
//! - [`consistency`]: upload gaps plus duration, title-length, engagement and
//!   top-performer breakdowns
//! - [`thumbnail`]: pixel statistics used by the thumbnail A/B test

pub mod consistency;
pub mod features;
pub mod themes;
pub mod thumbnail;

pub use consistency::{
    duration_patterns, engagement_patterns, title_length_patterns, upload_consistency,
    winning_patterns, ConsistencyLevel, DurationBucket, DurationPatterns, EngagementGroup,
    EngagementPatterns, TitleLengthBucket, UploadConsistency, WinningPatterns,
};
pub use features::{
    analyze_title_patterns, best_title_keywords, extract_features, simulate_title_change,
    simulate_with_patterns, title_recommendation, ChangeDirection, Confidence,
    KeywordPerformance, PatternChange, TitleFeature, TitlePattern, TitleSimulation,
};
pub use themes::{detect_content_themes, PerformanceTier, ThemeProfile};
pub use thumbnail::{analyze_rgb, analyze_thumbnail, ThumbnailFeatures};

use super::Analysis;
use crate::types::RecordSet;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static LONG_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w{4,}\b").expect("valid word regex"));

/// Count lowercase words of 4+ characters across titles.
///
/// Entries stay in first-seen order, so a stable sort by count keeps that
/// order among ties.
pub(crate) fn long_word_counts<'a>(
    titles: impl IntoIterator<Item = &'a str>,
) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for title in titles {
        let lower = title.to_lowercase();
        for word in LONG_WORD_RE.find_iter(&lower) {
            match index.get(word.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(word.as_str().to_string(), counts.len());
                    counts.push((word.as_str().to_string(), 1));
                }
            }
        }
    }
    counts
}

/// Every record-based pattern analysis in one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub title_patterns: Vec<TitlePattern>,
    pub best_keywords: Vec<KeywordPerformance>,
    pub content_themes: Vec<ThemeProfile>,
    pub duration_patterns: Analysis<DurationPatterns>,
    pub title_length_patterns: Vec<TitleLengthBucket>,
    pub engagement_patterns: Analysis<EngagementPatterns>,
    pub upload_consistency: Analysis<UploadConsistency>,
    pub winning_patterns: Analysis<WinningPatterns>,
}

pub fn all_patterns(records: &RecordSet, top_keywords: usize) -> PatternReport {
    PatternReport {
        title_patterns: analyze_title_patterns(records),
        best_keywords: best_title_keywords(records, top_keywords),
        content_themes: detect_content_themes(records),
        duration_patterns: duration_patterns(records),
        title_length_patterns: title_length_patterns(records),
        engagement_patterns: engagement_patterns(records),
        upload_consistency: upload_consistency(records),
        winning_patterns: winning_patterns(records),
    }
}
