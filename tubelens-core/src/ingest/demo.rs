//! Synthetic channel data for demos and tests.
//!
//! Output is fully determined by the seed and the reference time, so the same
//! invocation always yields the same channel.

use crate::types::{RecordSet, VideoRecord};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Title pool per content category.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Tutorial",
        &[
            "How to Grow Your YouTube Channel in 2024",
            "Complete Guide to Video Editing",
            "Beginner Tutorial: Getting Started",
            "Learn Video Editing in 10 Minutes",
            "How to Edit Like a Pro",
        ],
    ),
    (
        "Review",
        &[
            "Best Camera for YouTube - Honest Review",
            "Mic Review: Is It Worth It?",
            "Sony vs Canon - Which is Better?",
            "After 1 Month Using - True Review",
            "Product Review: Worth the Money?",
        ],
    ),
    (
        "List",
        &[
            "Top 10 Gadgets of 2024",
            "Top 5 Cameras for Creators",
            "Worst Tech Mistakes to Avoid",
            "Best Editing Software Ranked",
            "Top 7 Tips for Beginners",
        ],
    ),
    (
        "Entertainment",
        &[
            "24 Hour Challenge Gone Wrong",
            "I Tried Everything for 30 Days",
            "Day in My Life Vlog",
            "Storytime: How I Started",
            "Q&A - Answering Your Questions",
        ],
    ),
    (
        "Educational",
        &[
            "Why Your Videos Are Not Growing",
            "What is the YouTube Algorithm?",
            "Why Consistency Matters",
            "Understanding YouTube Analytics",
            "The Truth About Growing Fast",
        ],
    ),
    (
        "Tech",
        &[
            "New Phone Unboxing",
            "Computer Setup Tour",
            "Tech Tips and Tricks",
            "Best Laptop for Creators",
            "Technology Explained Simply",
        ],
    ),
];

/// Hours most uploads land on.
const PEAK_HOURS: [u32; 7] = [12, 14, 16, 18, 19, 20, 21];

/// Generate `count` videos published over the `count` days before `now`.
///
/// Older videos carry slightly more views (longer accumulation), about one
/// in twenty is a viral outlier, and long-form categories run longer.
pub fn generate_demo(count: usize, seed: u64, now: DateTime<Utc>) -> RecordSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = now - Duration::days(count as i64);
    let base_views: f64 = rng.random_range(5_000.0..50_000.0);

    let mut videos = Vec::with_capacity(count);
    for i in 0..count {
        let (category, titles) = CATEGORIES[rng.random_range(0..CATEGORIES.len())];
        let mut title = titles[rng.random_range(0..titles.len())].to_string();
        if rng.random_bool(0.3) {
            title = format!("{} - Part {}", title, rng.random_range(1..=5u32));
        }

        let day = start + Duration::days(rng.random_range(0..=count as i64));
        let hour = if rng.random_bool(0.7) {
            PEAK_HOURS[rng.random_range(0..PEAK_HOURS.len())]
        } else {
            rng.random_range(8..=23)
        };
        let published_at = day
            .date_naive()
            .and_hms_opt(hour, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(day)
            .fixed_offset();

        let age_factor = 1.0 + (count - i - 1) as f64 / count as f64 * 0.5;
        let mut views = base_views * age_factor * rng.random_range(0.2..3.0);
        if rng.random_bool(0.05) {
            views *= rng.random_range(3.0..10.0);
        }
        let views = views as u64;
        let likes = (views as f64 * rng.random_range(0.02..0.08)) as u64;
        let comments = (views as f64 * rng.random_range(0.002..0.02)) as u64;

        let mut record = VideoRecord::new(
            format!("video_{:04}", i + 1),
            title,
            published_at,
            views,
            likes,
            comments,
        );
        let impressions = (views as f64 * rng.random_range(2.0..5.0)) as u64;
        record.impressions = Some(impressions);
        record.ctr = Some(if impressions == 0 {
            0.0
        } else {
            (views as f64 / impressions as f64 * 10_000.0).round() / 100.0
        });
        record.subscribers_gained = Some((views as f64 * rng.random_range(0.01..0.05)) as u64);
        let watch_hours = views as f64 * rng.random_range(0.03..0.12);
        record.watch_time_hours = Some((watch_hours * 10.0).round() / 10.0);
        record.duration_seconds = Some(match category {
            "Tutorial" | "Educational" => rng.random_range(300..=1800),
            "List" | "Entertainment" => rng.random_range(180..=900),
            _ => rng.random_range(120..=600),
        });
        videos.push(record);
    }

    RecordSet::dedup_last(videos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_demo_is_deterministic() {
        let a = generate_demo(40, 7, now());
        let b = generate_demo(40, 7, now());
        assert_eq!(a, b);
        assert_ne!(a, generate_demo(40, 8, now()));
    }

    #[test]
    fn test_demo_shape() {
        let set = generate_demo(100, 42, now());
        assert_eq!(set.len(), 100);
        assert!(set.get("video_0001").is_some());
        assert!(set.get("video_0100").is_some());

        for video in set.iter() {
            let published = video.published_at.with_timezone(&Utc);
            assert!(published <= now() + Duration::days(1));
            assert!(published >= now() - Duration::days(101));
            assert!((8..=23).contains(&video.hour()));
            assert!(video.likes <= video.views);
            assert!(video.impressions.unwrap() >= video.views);
            assert!(!video.reach_estimated);
            assert!(video.duration_seconds.unwrap() >= 120);
        }
    }

    #[test]
    fn test_demo_empty() {
        assert!(generate_demo(0, 1, now()).is_empty());
    }
}
