//! Display labels for publish-time zones.
//!
//! Labels only. Hours are always reported in whatever offset the records
//! were stored with; nothing is ever converted.

use crate::types::RecordSet;
use serde::Serialize;

/// Human-readable names for a handful of common zones.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("UTC", "UTC (Coordinated Universal Time)"),
    ("US/Eastern", "ET (Eastern Time - US)"),
    ("US/Central", "CT (Central Time - US)"),
    ("US/Mountain", "MT (Mountain Time - US)"),
    ("US/Pacific", "PT (Pacific Time - US)"),
    ("Europe/London", "GMT/BST (UK Time)"),
    ("Europe/Paris", "CET/CEST (Central European Time)"),
    ("Asia/Tokyo", "JST (Japan Standard Time)"),
    ("Asia/Singapore", "SGT (Singapore Time)"),
    ("Asia/Dubai", "GST (Gulf Standard Time)"),
    ("Australia/Sydney", "AEST (Australian Eastern Time)"),
    ("Asia/Kolkata", "IST (India Standard Time)"),
    ("Asia/Manila", "PHT (Philippine Time)"),
    ("America/Sao_Paulo", "BRT (Brasília Time)"),
];

/// A zone name and its display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimezoneLabel {
    /// Zone name as given (e.g. "US/Eastern", "UTC+05:30")
    pub timezone: String,
    /// Human-readable form (e.g. "ET (Eastern Time - US)")
    pub timezone_display: String,
}

impl TimezoneLabel {
    /// Label a zone by name; unknown names read "<name> (Local Time)".
    pub fn new(timezone: impl Into<String>) -> Self {
        let timezone = timezone.into();
        let timezone_display = DISPLAY_NAMES
            .iter()
            .find(|(name, _)| *name == timezone)
            .map(|(_, display)| display.to_string())
            .unwrap_or_else(|| format!("{} (Local Time)", timezone));
        Self {
            timezone,
            timezone_display,
        }
    }

    pub fn utc() -> Self {
        Self::new("UTC")
    }

    /// Pick the label for a record set.
    ///
    /// A configured zone other than UTC wins; otherwise the offset carried by
    /// the timestamps; otherwise UTC.
    pub fn resolve(configured: Option<&str>, records: &RecordSet) -> Self {
        match configured.map(str::trim).filter(|tz| !tz.is_empty()) {
            Some(tz) if tz != "UTC" => Self::new(tz),
            _ => records
                .timezone_label()
                .map(Self::new)
                .unwrap_or_else(Self::utc),
        }
    }
}

impl Default for TimezoneLabel {
    fn default() -> Self {
        Self::utc()
    }
}
