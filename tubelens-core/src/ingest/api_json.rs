//! API-shaped JSON.
//!
//! Two shapes are accepted:
//! - an array of already normalized video objects (`video_id`, `views`, ...)
//! - a Data API `videos.list` response (`items[].snippet`, `items[].statistics`)
//!   where counters arrive as strings and duration as ISO 8601

use super::transform::{parse_count, parse_duration, RawVideo};
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiPayload {
    Normalized(Vec<ApiVideo>),
    VideoList(VideoListResponse),
}

/// One video in the normalized shape.
#[derive(Debug, Deserialize)]
struct ApiVideo {
    video_id: String,
    #[serde(default)]
    title: Option<String>,
    published_at: String,
    #[serde(default)]
    views: Option<u64>,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default)]
    comments: Option<u64>,
    #[serde(default)]
    impressions: Option<u64>,
    #[serde(default)]
    ctr: Option<f64>,
    #[serde(default)]
    watch_time_hours: Option<f64>,
    #[serde(default)]
    subscribers_gained: Option<u64>,
    #[serde(default)]
    duration_seconds: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    #[serde(default)]
    snippet: Option<VideoSnippet>,
    #[serde(default)]
    statistics: Option<VideoStatistics>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    published_at: String,
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

impl From<ApiVideo> for RawVideo {
    fn from(video: ApiVideo) -> Self {
        RawVideo {
            video_id: Some(video.video_id),
            title: video.title,
            published_at: Some(video.published_at),
            views: video.views,
            likes: video.likes,
            comments: video.comments,
            impressions: video.impressions,
            ctr: video.ctr,
            watch_time_hours: video.watch_time_hours,
            subscribers_gained: video.subscribers_gained,
            duration_seconds: video.duration_seconds,
        }
    }
}

impl From<VideoItem> for RawVideo {
    fn from(item: VideoItem) -> Self {
        let stats = item.statistics.unwrap_or_default();
        let count = |cell: Option<String>| cell.as_deref().and_then(parse_count);
        RawVideo {
            video_id: Some(item.id),
            title: item.snippet.as_ref().map(|s| s.title.clone()),
            published_at: item.snippet.map(|s| s.published_at),
            views: count(stats.view_count),
            likes: count(stats.like_count),
            comments: count(stats.comment_count),
            duration_seconds: item
                .content_details
                .and_then(|d| d.duration)
                .as_deref()
                .and_then(parse_duration),
            ..Default::default()
        }
    }
}

/// Parse API-shaped JSON into raw rows.
pub fn parse_api_json<R: Read>(reader: R) -> Result<Vec<RawVideo>> {
    let payload: ApiPayload = serde_json::from_reader(reader)?;
    let rows: Vec<RawVideo> = match payload {
        ApiPayload::Normalized(videos) => videos.into_iter().map(RawVideo::from).collect(),
        ApiPayload::VideoList(list) => list.items.into_iter().map(RawVideo::from).collect(),
    };
    tracing::debug!(rows = rows.len(), "Parsed API JSON");
    Ok(rows)
}
