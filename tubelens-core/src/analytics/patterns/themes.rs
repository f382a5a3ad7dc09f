//! Content themes clustered around recurring title keywords.

use super::long_word_counts;
use crate::analytics::stats::mean;
use crate::types::RecordSet;
use serde::Serialize;
use std::collections::HashMap;

/// Maximum themes reported.
const MAX_THEMES: usize = 10;

/// Keywords used when too few words recur.
const FALLBACK_KEYWORDS: usize = 10;

/// Example titles are cut to this many characters.
const EXAMPLE_TITLE_CHARS: usize = 50;

/// Theme mean views relative to the channel mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Below Average")]
    BelowAverage,
}

impl PerformanceTier {
    /// ≥1.5× → Excellent, ≥1× → Good, ≥0.5× → Average, else Below Average.
    pub fn rate(avg_views: f64, channel_avg: f64) -> Self {
        if avg_views >= channel_avg * 1.5 {
            PerformanceTier::Excellent
        } else if avg_views >= channel_avg {
            PerformanceTier::Good
        } else if avg_views >= channel_avg * 0.5 {
            PerformanceTier::Average
        } else {
            PerformanceTier::BelowAverage
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Average => "Average",
            PerformanceTier::BelowAverage => "Below Average",
        }
    }
}

/// A cluster of videos sharing one dominant keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeProfile {
    /// Keyword in title case (e.g. "Review")
    pub theme: String,
    pub count: usize,
    pub avg_views: f64,
    pub example_title: String,
    pub performance: PerformanceTier,
    /// Members, each in exactly one theme
    pub video_ids: Vec<String>,
}

/// Cluster videos by their longest recurring title keyword.
///
/// Words of 4+ characters used at least twice across the channel are
/// candidates; with fewer than 3 such words the 10 most frequent are used
/// instead. A video belongs to the longest candidate its title contains
/// (first seen wins on equal length) and to no theme if none match.
pub fn detect_content_themes(records: &RecordSet) -> Vec<ThemeProfile> {
    if records.is_empty() {
        return Vec::new();
    }

    let candidates = theme_candidates(records);
    let channel_avg = records.mean_views();

    // Keywords in first-assignment order
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<usize>> = HashMap::new();
    let lowered: Vec<String> = records.iter().map(|r| r.title.to_lowercase()).collect();

    for (idx, title) in lowered.iter().enumerate() {
        let primary = candidates
            .iter()
            .filter(|word| title.contains(word.as_str()))
            .fold(None::<&String>, |best, word| match best {
                Some(b) if b.chars().count() >= word.chars().count() => Some(b),
                _ => Some(word),
            });
        if let Some(keyword) = primary {
            let entry = members.entry(keyword.as_str()).or_default();
            if entry.is_empty() {
                order.push(keyword.as_str());
            }
            entry.push(idx);
        }
    }

    let videos = records.as_slice();
    let mut themes: Vec<ThemeProfile> = order
        .into_iter()
        .filter_map(|keyword| {
            let idxs = members.get(keyword)?;
            let views: Vec<f64> = idxs.iter().map(|i| videos[*i].views as f64).collect();
            let avg_views = mean(&views).floor();
            Some(ThemeProfile {
                theme: title_case(keyword),
                count: idxs.len(),
                avg_views,
                example_title: videos[idxs[0]].title.chars().take(EXAMPLE_TITLE_CHARS).collect(),
                performance: PerformanceTier::rate(avg_views, channel_avg),
                video_ids: idxs.iter().map(|i| videos[*i].video_id.clone()).collect(),
            })
        })
        .collect();

    themes.sort_by(|a, b| b.avg_views.total_cmp(&a.avg_views));
    themes.truncate(MAX_THEMES);
    themes
}

/// Candidate keywords in first-seen order.
fn theme_candidates(records: &RecordSet) -> Vec<String> {
    let counts = long_word_counts(records.iter().map(|r| r.title.as_str()));

    let recurring: Vec<String> = counts
        .iter()
        .filter(|(_, n)| *n >= 2)
        .map(|(w, _)| w.clone())
        .collect();
    if recurring.len() >= 3 {
        return recurring;
    }

    // Stable sort keeps first-seen order among equal counts
    let mut by_count = counts;
    by_count.sort_by(|a, b| b.1.cmp(&a.1));
    by_count
        .into_iter()
        .take(FALLBACK_KEYWORDS)
        .map(|(w, _)| w)
        .collect()
}

/// Uppercase the first letter of each alphabetic run.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
