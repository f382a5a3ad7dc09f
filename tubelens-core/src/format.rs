//! Formatting helpers shared by reports and CLIs.

use chrono::{DateTime, Utc};

/// Format an hour (0-23) as a 12-hour clock label.
///
/// Midnight and noon are spelled out: "12:00 AM (Midnight)", "12:00 PM (Noon)".
pub fn format_hour_ampm(hour: u32) -> String {
    match hour {
        0 => "12:00 AM (Midnight)".to_string(),
        12 => "12:00 PM (Noon)".to_string(),
        h if h < 12 => format!("{}:00 AM", h),
        h => format!("{}:00 PM", h - 12),
    }
}

/// Format an hour (0-23) as "HH:00".
pub fn format_hour_24h(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Compact count (e.g., "950", "12.3K", "4.1M").
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

/// Signed percentage (e.g., "+12.5%", "-3.0%").
pub fn format_delta(delta: f64) -> String {
    if delta >= 0.0 {
        format!("+{:.1}%", delta)
    } else {
        format!("{:.1}%", delta)
    }
}

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}
