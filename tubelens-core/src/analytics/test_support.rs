//! Record builders for analytics unit tests.

use crate::types::{RecordSet, VideoRecord};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().fixed_offset()
}

pub fn video(
    id: &str,
    title: &str,
    published_at: DateTime<FixedOffset>,
    views: u64,
) -> VideoRecord {
    VideoRecord::new(id, title, published_at, views, views / 20, views / 100)
}

pub fn records(videos: Vec<VideoRecord>) -> RecordSet {
    RecordSet::new(videos).unwrap()
}

/// One video per day starting 2024-01-01 with the given view counts.
pub fn daily(views: &[u64]) -> RecordSet {
    let start = at(2024, 1, 1, 12);
    records(
        views
            .iter()
            .enumerate()
            .map(|(i, v)| {
                video(
                    &format!("v{:03}", i),
                    &format!("Video {}", i),
                    start + chrono::Duration::days(i as i64),
                    *v,
                )
            })
            .collect(),
    )
}

/// Encode an image as PNG bytes.
pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}
