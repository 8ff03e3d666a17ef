//! Shared utilities for CLI commands.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use playlog_core::ActivityHistory;
use regex::Regex;
use serde::Deserialize;

/// Pre-compiled regex for calendar dates.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

/// Parse a bound as either an RFC 3339 instant or a calendar date.
///
/// Supports:
/// - RFC 3339: "2024-05-11T10:30:00Z"
/// - Date: "2024-05-11", meaning midnight UTC
pub fn parse_datetime(s: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = DATE_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use RFC 3339 (e.g., 2024-05-11T10:30:00Z) or a date (e.g., 2024-05-11)"
        );
    };

    let year: i32 = caps[1].parse().context("failed to parse year")?;
    let month: u32 = caps[2].parse().context("failed to parse month")?;
    let day: u32 = caps[3].parse().context("failed to parse day")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .with_context(|| format!("Invalid date: {s}"))
}

/// A history file holds one history or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryFile {
    Many(Vec<ActivityHistory>),
    One(Box<ActivityHistory>),
}

/// Reads every history stored in a JSON file.
pub fn load_histories(path: &Path) -> anyhow::Result<Vec<ActivityHistory>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: HistoryFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse activity history in {}", path.display()))?;

    let histories = match file {
        HistoryFile::Many(histories) => histories,
        HistoryFile::One(history) => vec![*history],
    };
    tracing::debug!(path = %path.display(), count = histories.len(), "loaded histories");
    Ok(histories)
}

/// Reads the histories of several files, in order.
pub fn load_all(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<ActivityHistory>> {
    let mut histories = Vec::new();
    for path in paths {
        histories.extend(load_histories(path.as_ref())?);
    }
    Ok(histories)
}

/// Formats seconds as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
pub fn format_duration(secs: i64) -> String {
    let total_minutes = secs.max(0) / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats an optional playtime, where `None` means unknown.
pub fn format_playtime(secs: Option<i64>) -> String {
    secs.map_or_else(|| "-".to_string(), format_duration)
}

/// Formats an optional instant to the minute.
pub fn format_instant(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M UTC").to_string())
}

/// Label for a history in human-readable output.
pub fn history_label(history_user: &str, index: usize) -> String {
    if history_user.is_empty() {
        format!("history #{}", index + 1)
    } else {
        history_user.to_string()
    }
}
