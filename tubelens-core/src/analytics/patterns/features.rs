//! Title features and their correlation with views.

use crate::analytics::stats::{mean, round2};
use crate::types::RecordSet;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("valid digit regex"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

/// Both sides of a comparison need at least this many videos.
pub const MIN_SAMPLE_SIZE: usize = 3;

/// Per-feature improvement is clamped to ±this.
pub const FEATURE_IMPROVEMENT_CAP: f64 = 30.0;

/// Simulated title changes are clamped to ±this.
pub const SIMULATION_CAP: f64 = 25.0;

/// Averaged impacts are scaled by this before clamping.
pub const SIMULATION_DAMPING: f64 = 0.5;

/// A lexical feature a title can carry.
///
/// Matching is case-insensitive substring matching, so "pro" also fires on
/// "product" and "vs" on "canvas".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleFeature {
    Number,
    #[serde(rename = "howto")]
    HowTo,
    Tips,
    Secrets,
    Guide,
    Versus,
    List,
    Review,
    Myth,
    Why,
    Best,
    Beginner,
    Advanced,
    Question,
}

impl TitleFeature {
    pub const ALL: [TitleFeature; 14] = [
        TitleFeature::Number,
        TitleFeature::HowTo,
        TitleFeature::Tips,
        TitleFeature::Secrets,
        TitleFeature::Guide,
        TitleFeature::Versus,
        TitleFeature::List,
        TitleFeature::Review,
        TitleFeature::Myth,
        TitleFeature::Why,
        TitleFeature::Best,
        TitleFeature::Beginner,
        TitleFeature::Advanced,
        TitleFeature::Question,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TitleFeature::Number => "number",
            TitleFeature::HowTo => "howto",
            TitleFeature::Tips => "tips",
            TitleFeature::Secrets => "secrets",
            TitleFeature::Guide => "guide",
            TitleFeature::Versus => "versus",
            TitleFeature::List => "list",
            TitleFeature::Review => "review",
            TitleFeature::Myth => "myth",
            TitleFeature::Why => "why",
            TitleFeature::Best => "best",
            TitleFeature::Beginner => "beginner",
            TitleFeature::Advanced => "advanced",
            TitleFeature::Question => "question",
        }
    }

    /// Substrings that trigger the feature. `Number` is matched separately.
    fn needles(&self) -> &'static [&'static str] {
        match self {
            TitleFeature::Number => &[],
            TitleFeature::HowTo => &["how to", "how-to"],
            TitleFeature::Tips => &["tip"],
            TitleFeature::Secrets => &["secret"],
            TitleFeature::Guide => &["guide", "tutorial"],
            TitleFeature::Versus => &["vs", "versus"],
            TitleFeature::List => &["list"],
            TitleFeature::Review => &["review"],
            TitleFeature::Myth => &["myth", "false"],
            TitleFeature::Why => &["why"],
            TitleFeature::Best => &["best"],
            TitleFeature::Beginner => &["beginner", "start"],
            TitleFeature::Advanced => &["advanced", "pro"],
            TitleFeature::Question => &["?"],
        }
    }

    /// Whether `title` carries this feature.
    pub fn matches(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.matches_lower(&lower)
    }

    fn matches_lower(&self, lower: &str) -> bool {
        match self {
            TitleFeature::Number => DIGIT_RE.is_match(lower),
            other => other.needles().iter().any(|n| lower.contains(n)),
        }
    }
}

impl fmt::Display for TitleFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features present in a title, in declaration order.
pub fn extract_features(title: &str) -> Vec<TitleFeature> {
    let lower = title.to_lowercase();
    TitleFeature::ALL
        .into_iter()
        .filter(|f| f.matches_lower(&lower))
        .collect()
}

/// How much a sample-size based estimate can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// High at 20+ samples, Medium at 10+, else Low.
    pub fn from_samples(total: usize) -> Self {
        if total >= 20 {
            Confidence::High
        } else if total >= 10 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mean views with and without one title feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitlePattern {
    pub feature: TitleFeature,
    pub avg_views_with: f64,
    pub avg_views_without: f64,
    /// (with − without) / without × 100, clamped to ±30
    pub improvement_percentage: f64,
    pub sample_size_with: usize,
    pub sample_size_without: usize,
    pub confidence: Confidence,
    pub recommendation: String,
}

/// Correlate every title feature with views.
///
/// A feature is skipped unless both sides have at least [`MIN_SAMPLE_SIZE`]
/// videos and the "without" side averages more than zero views.
pub fn analyze_title_patterns(records: &RecordSet) -> Vec<TitlePattern> {
    let titles: Vec<(String, f64)> = records
        .iter()
        .map(|r| (r.title.to_lowercase(), r.views as f64))
        .collect();

    TitleFeature::ALL
        .into_iter()
        .filter_map(|feature| {
            let (with, without): (Vec<_>, Vec<_>) =
                titles.iter().partition(|(title, _)| feature.matches_lower(title));
            if with.len() < MIN_SAMPLE_SIZE || without.len() < MIN_SAMPLE_SIZE {
                return None;
            }

            let avg_with = mean(&with.iter().map(|(_, v)| *v).collect::<Vec<_>>());
            let avg_without = mean(&without.iter().map(|(_, v)| *v).collect::<Vec<_>>());
            if avg_without <= 0.0 {
                return None;
            }

            let improvement = ((avg_with - avg_without) / avg_without * 100.0)
                .clamp(-FEATURE_IMPROVEMENT_CAP, FEATURE_IMPROVEMENT_CAP);

            Some(TitlePattern {
                feature,
                avg_views_with: avg_with,
                avg_views_without: avg_without,
                improvement_percentage: round2(improvement),
                sample_size_with: with.len(),
                sample_size_without: without.len(),
                confidence: Confidence::from_samples(with.len() + without.len()),
                recommendation: if improvement > 0.0 {
                    "Use this pattern".to_string()
                } else {
                    "Avoid this pattern".to_string()
                },
            })
        })
        .collect()
}

// ============================================
// Title-change simulation
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeDirection {
    Added,
    Removed,
}

/// One feature that differs between the two titles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternChange {
    pub pattern: TitleFeature,
    pub change: ChangeDirection,
    pub expected_impact: f64,
    pub confidence: Confidence,
    /// Videos backing the side the new title lands on
    pub sample_size: usize,
}

/// Predicted effect of replacing `current_title` with `new_title`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSimulation {
    pub current_title: String,
    pub new_title: String,
    /// Damped, clamped mean of the changed features' impacts
    pub expected_improvement: f64,
    /// `expected_improvement` as a signed percentage string
    pub expected_views_change: String,
    pub confidence: String,
    pub pattern_details: Vec<PatternChange>,
    pub total_videos: usize,
    pub sample_message: String,
    pub recommendation: String,
}

/// Simulate a title swap against the channel's own feature correlations.
pub fn simulate_title_change(
    records: &RecordSet,
    current_title: &str,
    new_title: &str,
) -> TitleSimulation {
    let patterns = analyze_title_patterns(records);
    simulate_with_patterns(&patterns, records.len(), current_title, new_title)
}

/// Simulate against already computed feature correlations.
pub fn simulate_with_patterns(
    patterns: &[TitlePattern],
    total_videos: usize,
    current_title: &str,
    new_title: &str,
) -> TitleSimulation {
    let current = extract_features(current_title);
    let new = extract_features(new_title);

    let pattern_details: Vec<PatternChange> = patterns
        .iter()
        .filter_map(|p| {
            let before = current.contains(&p.feature);
            let after = new.contains(&p.feature);
            match (before, after) {
                (false, true) => Some(PatternChange {
                    pattern: p.feature,
                    change: ChangeDirection::Added,
                    expected_impact: p.improvement_percentage,
                    confidence: p.confidence,
                    sample_size: p.sample_size_with,
                }),
                (true, false) => Some(PatternChange {
                    pattern: p.feature,
                    change: ChangeDirection::Removed,
                    expected_impact: -p.improvement_percentage,
                    confidence: p.confidence,
                    sample_size: p.sample_size_without,
                }),
                _ => None,
            }
        })
        .collect();

    let impacts: Vec<f64> = pattern_details.iter().map(|d| d.expected_impact).collect();
    let expected = if impacts.is_empty() {
        0.0
    } else {
        (mean(&impacts) * SIMULATION_DAMPING).clamp(-SIMULATION_CAP, SIMULATION_CAP)
    };
    let expected = round2(expected);

    TitleSimulation {
        current_title: current_title.to_string(),
        new_title: new_title.to_string(),
        expected_improvement: expected,
        expected_views_change: signed_percent(expected),
        confidence: simulation_confidence(&pattern_details).to_string(),
        pattern_details,
        total_videos,
        sample_message: format!("Based on {} videos in your channel history", total_videos),
        recommendation: title_recommendation(expected).to_string(),
    }
}

/// Signed percentage keeping at least one decimal: "+10.0%", "-2.35%", "0.0%".
fn signed_percent(value: f64) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    if value.fract() == 0.0 {
        format!("{sign}{value:.1}%")
    } else {
        format!("{sign}{value}%")
    }
}

fn simulation_confidence(details: &[PatternChange]) -> &'static str {
    if details.is_empty() {
        return "Low";
    }
    if details.iter().any(|d| d.sample_size < MIN_SAMPLE_SIZE) {
        return "Low - Need more data";
    }
    match details.len() {
        n if n >= 3 => "Medium",
        2 => "Low-Medium",
        _ => "Low - Limited data",
    }
}

/// Recommendation text bucketed by the expected change.
pub fn title_recommendation(expected: f64) -> &'static str {
    if expected > 10.0 {
        "Moderately recommended - slight improvement possible"
    } else if expected > 3.0 {
        "Slight improvement possible - worth testing"
    } else if expected > -3.0 {
        "Minimal impact expected - title change unlikely to help"
    } else if expected > -10.0 {
        "Not recommended - slight decrease possible"
    } else {
        "Avoid this change - negative impact likely"
    }
}

// ============================================
// Keywords
// ============================================

/// Mean views of videos whose titles use a keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordPerformance {
    pub keyword: String,
    pub avg_views: f64,
    pub total_videos: usize,
}

/// Top `n` title words (longer than 3 chars, used 3+ times) by mean views.
pub fn best_title_keywords(records: &RecordSet, n: usize) -> Vec<KeywordPerformance> {
    let mut stats: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in records {
        let lower = record.title.to_lowercase();
        for word in WORD_RE.find_iter(&lower) {
            if word.as_str().chars().count() > 3 {
                stats
                    .entry(word.as_str().to_string())
                    .or_default()
                    .push(record.views as f64);
            }
        }
    }

    let mut keywords: Vec<KeywordPerformance> = stats
        .into_iter()
        .filter(|(_, views)| views.len() >= MIN_SAMPLE_SIZE)
        .map(|(keyword, views)| KeywordPerformance {
            keyword,
            avg_views: mean(&views),
            total_videos: views.len(),
        })
        .collect();
    keywords.sort_by(|a, b| b.avg_views.total_cmp(&a.avg_views));
    keywords.truncate(n);
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{at, records, video};
    use chrono::Duration;

    fn channel(titles_and_views: &[(&str, u64)]) -> RecordSet {
        records(
            titles_and_views
                .iter()
                .enumerate()
                .map(|(i, (title, views))| {
                    let published = at(2024, 1, 1, 12) + Duration::days(i as i64);
                    video(&format!("v{}", i), title, published, *views)
                })
                .collect(),
        )
    }

    #[test]
    fn test_extract_features() {
        assert_eq!(
            extract_features("How to Start: 5 Tips?"),
            vec![
                TitleFeature::Number,
                TitleFeature::HowTo,
                TitleFeature::Tips,
                TitleFeature::Beginner,
                TitleFeature::Question
            ]
        );
        assert!(TitleFeature::Versus.matches("iPhone VS Android"));
        assert!(TitleFeature::Advanced.matches("Product launch"));
        assert!(extract_features("Morning walk").is_empty());
    }

    #[test]
    fn test_feature_requires_three_per_side() {
        let set = channel(&[
            ("Why A", 100),
            ("Why B", 100),
            ("Plain C", 100),
            ("Plain D", 100),
            ("Plain E", 100),
        ]);
        assert!(analyze_title_patterns(&set)
            .iter()
            .all(|p| p.sample_size_with >= 3 && p.sample_size_without >= 3));
        assert!(analyze_title_patterns(&set)
            .iter()
            .all(|p| p.feature != TitleFeature::Why));
    }

    #[test]
    fn test_improvement_clamped_and_confidence() {
        let set = channel(&[
            ("Why A", 1000),
            ("Why B", 1000),
            ("Why C", 1000),
            ("Plain D", 100),
            ("Plain E", 100),
            ("Plain F", 100),
        ]);
        let patterns = analyze_title_patterns(&set);
        let why = patterns.iter().find(|p| p.feature == TitleFeature::Why).unwrap();
        assert_eq!(why.improvement_percentage, 30.0);
        assert_eq!(why.avg_views_with, 1000.0);
        assert_eq!(why.confidence, Confidence::Low);
        assert_eq!(why.recommendation, "Use this pattern");
    }

    #[test]
    fn test_simulation_question_added() {
        let set = channel(&[
            ("Is it worth it?", 1200),
            ("Can you do this?", 1200),
            ("Did it work?", 1200),
            ("Plain one", 1000),
            ("Plain two", 1000),
            ("Plain three", 1000),
        ]);
        let sim = simulate_title_change(&set, "Camera tour", "Camera tour?");
        assert_eq!(sim.pattern_details.len(), 1);
        assert_eq!(sim.pattern_details[0].pattern, TitleFeature::Question);
        assert_eq!(sim.pattern_details[0].change, ChangeDirection::Added);
        assert_eq!(sim.expected_improvement, 10.0);
        assert_eq!(sim.expected_views_change, "+10.0%");
        assert_eq!(sim.confidence, "Low - Limited data");
        assert_eq!(sim.recommendation, "Slight improvement possible - worth testing");

        let reverse = simulate_title_change(&set, "Camera tour?", "Camera tour");
        assert_eq!(reverse.pattern_details[0].change, ChangeDirection::Removed);
        assert_eq!(reverse.expected_improvement, -10.0);
        assert_eq!(reverse.expected_views_change, "-10.0%");
    }

    #[test]
    fn test_signed_percent_keeps_a_decimal() {
        assert_eq!(signed_percent(10.0), "+10.0%");
        assert_eq!(signed_percent(12.34), "+12.34%");
        assert_eq!(signed_percent(-2.5), "-2.5%");
        assert_eq!(signed_percent(0.0), "0.0%");
    }

    #[test]
    fn test_simulation_bounded() {
        let patterns: Vec<TitlePattern> = TitleFeature::ALL
            .into_iter()
            .map(|feature| TitlePattern {
                feature,
                avg_views_with: 0.0,
                avg_views_without: 0.0,
                improvement_percentage: 30.0,
                sample_size_with: 50,
                sample_size_without: 50,
                confidence: Confidence::High,
                recommendation: String::new(),
            })
            .collect();
        let sim = simulate_with_patterns(&patterns, 100, "plain", "Why 10 best pro tips vs myths?");
        assert!(sim.expected_improvement <= SIMULATION_CAP);
        assert_eq!(sim.expected_improvement, 15.0);
        assert_eq!(sim.confidence, "Medium");

        let none = simulate_with_patterns(&[], 0, "a", "b");
        assert_eq!(none.expected_improvement, 0.0);
        assert_eq!(none.confidence, "Low");
        assert_eq!(none.expected_views_change, "0.0%");
    }

    #[test]
    fn test_title_recommendation_buckets() {
        assert!(title_recommendation(12.0).starts_with("Moderately recommended"));
        assert!(title_recommendation(0.0).starts_with("Minimal impact"));
        assert!(title_recommendation(-5.0).starts_with("Not recommended"));
        assert!(title_recommendation(-20.0).starts_with("Avoid"));
    }

    #[test]
    fn test_best_title_keywords() {
        let set = channel(&[
            ("Camera review", 100),
            ("Camera setup", 300),
            ("Camera tips", 200),
            ("Lens review", 900),
            ("Lens review two", 900),
        ]);
        let keywords = best_title_keywords(&set, 10);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].keyword, "review");
        assert!((keywords[0].avg_views - 633.333).abs() < 0.01);
        assert_eq!(keywords[1].keyword, "camera");
        assert_eq!(keywords[1].total_videos, 3);
    }
}
