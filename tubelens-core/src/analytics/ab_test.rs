//! Title and thumbnail A/B simulation.
//!
//! Titles are scored against the channel's own feature correlations
//! ([`simulate_title_change`]); thumbnails are scored independently from
//! pixel statistics and compared on a points table.

use super::patterns::{
    analyze_thumbnail, simulate_title_change, ThumbnailFeatures, TitleSimulation,
};
use super::stats::mean;
use super::Analysis;
use crate::types::RecordSet;
use serde::Serialize;

/// YouTube's native thumbnail ratio.
const TARGET_ASPECT: f64 = 16.0 / 9.0;

/// Words that tend to lift emotional response.
const POWER_WORDS: &[&str] = &[
    "secret", "best", "ultimate", "proven", "exclusive", "free", "new", "instant",
];

// ============================================
// Titles
// ============================================

/// Which title to ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TitleVerdict {
    #[serde(rename = "Use Title A")]
    UseA,
    #[serde(rename = "Use Title B")]
    UseB,
    #[serde(rename = "Either title could work")]
    Either,
}

impl TitleVerdict {
    /// B above +5%, A below −5%, otherwise either.
    pub fn from_expected(expected: f64) -> Self {
        if expected > 5.0 {
            TitleVerdict::UseB
        } else if expected < -5.0 {
            TitleVerdict::UseA
        } else {
            TitleVerdict::Either
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TitleVerdict::UseA => "Use Title A",
            TitleVerdict::UseB => "Use Title B",
            TitleVerdict::Either => "Either title could work",
        }
    }
}

/// Outcome of testing title A (current) against title B (candidate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleTestResult {
    #[serde(flatten)]
    pub simulation: TitleSimulation,
    pub verdict: TitleVerdict,
    /// Heuristic tips for title B
    pub improvement_tips: Vec<String>,
}

pub fn run_title_test(records: &RecordSet, title_a: &str, title_b: &str) -> TitleTestResult {
    let simulation = simulate_title_change(records, title_a, title_b);
    TitleTestResult {
        verdict: TitleVerdict::from_expected(simulation.expected_improvement),
        improvement_tips: title_improvement_tips(title_b),
        simulation,
    }
}

/// One tip per title heuristic the title misses.
pub fn title_improvement_tips(title: &str) -> Vec<String> {
    let lower = title.to_lowercase();
    let len = title.chars().count();
    let mut tips = Vec::new();

    if !title.chars().any(|c| c.is_ascii_digit()) {
        tips.push(
            "Add numbers to your title (e.g., '5 Tips', '10 Ways') to make the payoff concrete".to_string(),
        );
    }
    if !title.contains('?') {
        tips.push("Consider using a question to spark curiosity".to_string());
    }
    if len < 30 {
        tips.push("Title is quite short. Aim for 50-70 characters for optimal display".to_string());
    } else if len > 80 {
        tips.push(
            "Title is long. Consider shortening to 50-70 characters so it doesn't get cut off".to_string(),
        );
    }
    if !POWER_WORDS.iter().any(|w| lower.contains(w)) {
        tips.push(
            "Add power words like 'Secret', 'Best', 'Proven', or 'Ultimate' to increase emotional response".to_string(),
        );
    }
    if !["how to", "tutorial", "guide"].iter().any(|p| lower.contains(p)) {
        tips.push(
            "For educational content, include 'How to' or 'Guide' to signal value".to_string(),
        );
    }
    if tips.is_empty() {
        tips.push("Title follows good practices! Test it and see how it performs.".to_string());
    }
    tips
}

// ============================================
// Title length
// ============================================

/// Bins are right-inclusive: (0, 40], (40, 60], ...
const LENGTH_BINS: &[(&str, usize, usize)] = &[
    ("Very Short", 0, 40),
    ("Short", 40, 60),
    ("Medium", 60, 80),
    ("Long", 80, 100),
    ("Very Long", 100, 200),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleLengthBin {
    pub label: &'static str,
    pub count: usize,
    pub avg_views: f64,
    pub avg_ctr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleLengthAnalysis {
    pub bins: Vec<TitleLengthBin>,
    pub optimal_length: &'static str,
    pub recommendation: String,
}

/// Mean views per title-length bin and the best bin.
///
/// Titles longer than 200 characters fall outside every bin.
pub fn title_length_analysis(records: &RecordSet) -> Analysis<TitleLengthAnalysis> {
    let bins: Vec<TitleLengthBin> = LENGTH_BINS
        .iter()
        .filter_map(|&(label, low, high)| {
            let members: Vec<_> = records
                .iter()
                .filter(|r| {
                    let len = r.title_len();
                    len > low && len <= high
                })
                .collect();
            if members.is_empty() {
                return None;
            }
            let ctrs: Vec<f64> = members.iter().filter_map(|r| r.ctr_proxy()).collect();
            Some(TitleLengthBin {
                label,
                count: members.len(),
                avg_views: mean(&members.iter().map(|r| r.views as f64).collect::<Vec<_>>()),
                avg_ctr: (!ctrs.is_empty()).then(|| mean(&ctrs)),
            })
        })
        .collect();

    let best = bins.iter().fold(None::<&TitleLengthBin>, |best, bin| match best {
        Some(b) if bin.avg_views <= b.avg_views => Some(b),
        _ => Some(bin),
    });
    let Some(best) = best else {
        return Analysis::insufficient("No data available");
    };
    let optimal_length = best.label;

    Analysis::ready(TitleLengthAnalysis {
        recommendation: format!("Titles around {} perform best", optimal_length),
        optimal_length,
        bins,
    })
}

// ============================================
// Thumbnails
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    A,
    B,
    Tie,
}

/// Points-based comparison of two thumbnails.
///
/// When either image cannot be decoded, `error` is set, both scores are 0
/// and there is no winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailComparison {
    pub winner: Option<Winner>,
    pub score_a: u32,
    pub score_b: u32,
    pub analysis_a: Option<ThumbnailFeatures>,
    pub analysis_b: Option<ThumbnailFeatures>,
    pub reasons_a: Vec<String>,
    pub reasons_b: Vec<String>,
    pub recommendation: String,
    pub improvement_tips: Vec<String>,
    pub error: Option<String>,
}

impl ThumbnailComparison {
    fn failed(error: String) -> Self {
        Self {
            winner: None,
            score_a: 0,
            score_b: 0,
            analysis_a: None,
            analysis_b: None,
            reasons_a: Vec::new(),
            reasons_b: Vec::new(),
            recommendation: "Unable to analyze thumbnails".to_string(),
            improvement_tips: Vec::new(),
            error: Some(error),
        }
    }
}

/// Decode and compare two thumbnails. Never fails; decode errors are
/// reported in the result.
pub fn compare_thumbnail_bytes(a: &[u8], b: &[u8]) -> ThumbnailComparison {
    match (analyze_thumbnail(a), analyze_thumbnail(b)) {
        (Ok(a), Ok(b)) => compare_thumbnails(&a, &b),
        (Err(e), _) => {
            tracing::warn!(error = %e, "thumbnail A could not be analyzed");
            ThumbnailComparison::failed(format!("Thumbnail A: {}", e))
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "thumbnail B could not be analyzed");
            ThumbnailComparison::failed(format!("Thumbnail B: {}", e))
        }
    }
}

/// Award points per image, then to the better of the pair.
///
/// | Criterion | Points |
/// |-----------|--------|
/// | brightness in [100, 180] | 15, else 5 |
/// | higher contrast | 10 (5 each on a tie) |
/// | higher colorfulness | 10 (5 each on a tie) |
/// | face-like | 20 |
/// | text-like | 15 |
/// | higher edge intensity | 10 |
/// | aspect closer to 16:9 | 10 |
pub fn compare_thumbnails(a: &ThumbnailFeatures, b: &ThumbnailFeatures) -> ThumbnailComparison {
    let mut sa = Scorecard::default();
    let mut sb = Scorecard::default();

    for (card, features) in [(&mut sa, a), (&mut sb, b)] {
        match features.brightness {
            v if (100.0..=180.0).contains(&v) => card.award(15, "Good brightness"),
            v if v > 180.0 => card.award(5, "Slightly bright"),
            _ => card.award(5, "Could be brighter"),
        }
    }

    compare_higher(&mut sa, &mut sb, a.contrast, b.contrast, "Better contrast", Some(5));
    compare_higher(
        &mut sa,
        &mut sb,
        a.colorfulness,
        b.colorfulness,
        "More vibrant colors",
        Some(5),
    );

    for (card, features) in [(&mut sa, a), (&mut sb, b)] {
        if features.has_face_like_features {
            card.award(20, "Contains face (great for CTR!)");
        }
        if features.has_text_like_features {
            card.award(15, "Has text/sharp elements");
        }
    }

    compare_higher(&mut sa, &mut sb, a.edge_intensity, b.edge_intensity, "Sharper image", None);
    // Closer to 16:9 means a smaller (negated) distance
    compare_higher(
        &mut sa,
        &mut sb,
        -(a.aspect_ratio - TARGET_ASPECT).abs(),
        -(b.aspect_ratio - TARGET_ASPECT).abs(),
        "Better aspect ratio (closer to 16:9)",
        None,
    );

    let (winner, recommendation) = if sa.score > sb.score {
        (
            Winner::A,
            format!(
                "Thumbnail A scores {} vs {}. It wins because: {}.",
                sa.score,
                sb.score,
                sa.top_reasons()
            ),
        )
    } else if sb.score > sa.score {
        (
            Winner::B,
            format!(
                "Thumbnail B scores {} vs {}. It wins because: {}.",
                sb.score,
                sa.score,
                sb.top_reasons()
            ),
        )
    } else {
        (
            Winner::Tie,
            format!("Both thumbnails score equally ({}). Either could work well.", sa.score),
        )
    };

    ThumbnailComparison {
        winner: Some(winner),
        score_a: sa.score,
        score_b: sb.score,
        analysis_a: Some(a.clone()),
        analysis_b: Some(b.clone()),
        reasons_a: sa.reasons,
        reasons_b: sb.reasons,
        recommendation,
        improvement_tips: thumbnail_tips(a, b),
        error: None,
    }
}

#[derive(Default)]
struct Scorecard {
    score: u32,
    reasons: Vec<String>,
}

impl Scorecard {
    fn award(&mut self, points: u32, reason: &str) {
        self.score += points;
        self.reasons.push(reason.to_string());
    }

    fn top_reasons(&self) -> String {
        self.reasons.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
    }
}

/// 10 points to the higher value; on a tie, `tie_points` each without a reason.
fn compare_higher(
    sa: &mut Scorecard,
    sb: &mut Scorecard,
    a: f64,
    b: f64,
    reason: &str,
    tie_points: Option<u32>,
) {
    if a > b {
        sa.award(10, reason);
    } else if b > a {
        sb.award(10, reason);
    } else if let Some(points) = tie_points {
        sa.score += points;
        sb.score += points;
    }
}

/// Tips drawn from the pair's combined features.
pub fn thumbnail_tips(a: &ThumbnailFeatures, b: &ThumbnailFeatures) -> Vec<String> {
    let mut tips = Vec::new();

    let brightness = (a.brightness + b.brightness) / 2.0;
    if brightness < 100.0 {
        tips.push("Increase brightness - thumbnails should be well-lit and eye-catching");
    } else if brightness > 200.0 {
        tips.push("Reduce brightness slightly - avoid overexposed thumbnails");
    }
    if (a.contrast + b.contrast) / 2.0 < 30.0 {
        tips.push("Increase contrast - make elements pop with stronger color differences");
    }
    if !a.has_face_like_features && !b.has_face_like_features {
        tips.push("Consider adding a human face with emotion - faces significantly boost CTR");
    }
    if !a.has_text_like_features && !b.has_text_like_features {
        tips.push("Add bold, readable text (3-4 words max) to communicate value quickly");
    }
    if (a.colorfulness + b.colorfulness) / 2.0 < 50.0 {
        tips.push("Use more vibrant colors - colorful thumbnails stand out in search results");
    }
    if (a.aspect_ratio - TARGET_ASPECT).abs() > 0.2 || (b.aspect_ratio - TARGET_ASPECT).abs() > 0.2
    {
        tips.push("Use 16:9 aspect ratio (1280x720) - optimal for YouTube display");
    }
    if tips.is_empty() {
        tips.push(
            "Both thumbnails look good! Test them to see which performs better with your audience.",
        );
    }

    tips.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{at, png_bytes, records, video};
    use chrono::Duration;
    use image::{Rgb, RgbImage};

    fn features(brightness: f64, contrast: f64, face: bool, aspect: f64) -> ThumbnailFeatures {
        ThumbnailFeatures {
            brightness,
            contrast,
            colorfulness: 60.0,
            edge_intensity: 25.0,
            has_face_like_features: face,
            has_text_like_features: true,
            composition_score: 10.0,
            width: 1280,
            height: 720,
            aspect_ratio: aspect,
        }
    }

    #[test]
    fn test_identical_images_tie() {
        let image = RgbImage::from_fn(64, 36, |x, y| Rgb([(x * 4) as u8, (y * 7) as u8, 90]));
        let bytes = png_bytes(&image);
        let result = compare_thumbnail_bytes(&bytes, &bytes);
        assert_eq!(result.winner, Some(Winner::Tie));
        assert_eq!(result.score_a, result.score_b);
        assert!(result.error.is_none());
        assert!(result.recommendation.starts_with("Both thumbnails score equally"));
    }

    #[test]
    fn test_scoring_table() {
        let a = features(140.0, 50.0, true, 1.78);
        let b = features(60.0, 40.0, false, 1.0);
        let result = compare_thumbnails(&a, &b);
        // A: 15 brightness, 10 contrast, 5 colour tie, 20 face, 15 text, 10 aspect
        assert_eq!(result.score_a, 75);
        // B: 5 brightness, 5 colour tie, 15 text; edges tie for nothing
        assert_eq!(result.score_b, 25);
        assert_eq!(result.winner, Some(Winner::A));
        assert!(result.reasons_a.contains(&"Better contrast".to_string()));
        assert!(result
            .recommendation
            .starts_with("Thumbnail A scores 75 vs 25. It wins because: Good brightness, Better contrast"));
    }

    #[test]
    fn test_invalid_image_is_neutral() {
        let good = png_bytes(&RgbImage::from_pixel(16, 9, Rgb([10, 20, 30])));
        let result = compare_thumbnail_bytes(&good, b"garbage");
        assert_eq!(result.winner, None);
        assert_eq!(result.score_a, 0);
        assert_eq!(result.score_b, 0);
        assert!(result.error.unwrap().starts_with("Thumbnail B"));
    }

    #[test]
    fn test_thumbnail_tips() {
        let dark = features(40.0, 10.0, false, 1.0);
        let tips = thumbnail_tips(&dark, &dark);
        assert!(tips[0].starts_with("Increase brightness"));
        assert!(tips.iter().any(|t| t.starts_with("Use 16:9")));
        assert!(tips.iter().any(|t| t.starts_with("Consider adding a human face")));

        let good = features(140.0, 50.0, true, 1.78);
        assert_eq!(thumbnail_tips(&good, &good).len(), 1);
    }

    #[test]
    fn test_title_tips() {
        let tips = title_improvement_tips("Vlog");
        assert_eq!(tips.len(), 5);
        let tips = title_improvement_tips("How to Find the Best 5 Secret Camera Settings Today?");
        assert_eq!(tips, vec!["Title follows good practices! Test it and see how it performs."]);
    }

    #[test]
    fn test_title_verdict() {
        assert_eq!(TitleVerdict::from_expected(6.0), TitleVerdict::UseB);
        assert_eq!(TitleVerdict::from_expected(-6.0), TitleVerdict::UseA);
        assert_eq!(TitleVerdict::from_expected(5.0), TitleVerdict::Either);
    }

    #[test]
    fn test_run_title_test() {
        let titles = ["Why A", "Why B", "Why C", "Plain D", "Plain E", "Plain F"];
        let views = [1000, 1000, 1000, 100, 100, 100];
        let set = records(
            titles
                .iter()
                .zip(views)
                .enumerate()
                .map(|(i, (t, v))| {
                    let published = at(2024, 1, 1, 9) + Duration::days(i as i64);
                    video(&format!("v{}", i), t, published, v)
                })
                .collect(),
        );
        let result = run_title_test(&set, "Camera tips", "Why camera tips");
        assert_eq!(result.simulation.expected_improvement, 15.0);
        assert_eq!(result.verdict, TitleVerdict::UseB);
        assert!(!result.improvement_tips.is_empty());
    }

    #[test]
    fn test_title_length_analysis() {
        let set = records(vec![
            video("a", &"x".repeat(20), at(2024, 1, 1, 9), 100),
            video("b", &"x".repeat(50), at(2024, 1, 2, 9), 900),
            video("c", &"x".repeat(40), at(2024, 1, 3, 9), 300),
        ]);
        let analysis = title_length_analysis(&set).into_value().unwrap();
        assert_eq!(analysis.bins.len(), 2);
        assert_eq!(analysis.bins[0].count, 2);
        assert_eq!(analysis.optimal_length, "Short");
        assert_eq!(analysis.recommendation, "Titles around Short perform best");
        assert!(!title_length_analysis(&RecordSet::empty()).is_ready());
    }
}
