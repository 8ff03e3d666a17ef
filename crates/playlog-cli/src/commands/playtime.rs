//! Playtime command: bounded play time for one unlock mode.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use playlog_core::{ActivityHistory, Timeline, TimelineConfig, UnlockMode};

use super::util::{format_playtime, history_label, load_histories, parse_datetime};

/// Play time of one history between optional bounds.
pub fn playtime_for(
    history: &ActivityHistory,
    config: &TimelineConfig,
    mode: UnlockMode,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<i64> {
    let timeline = Timeline::from_history(history, config);
    let summary = timeline.summarize();
    timeline.calculate_playtime(start, end, mode, &summary)
}

/// Runs the playtime command.
pub fn run(
    file: &Path,
    mode: UnlockMode,
    start: Option<&str>,
    end: Option<&str>,
    config: &TimelineConfig,
) -> Result<()> {
    let start = start.map(parse_datetime).transpose()?;
    let end = end.map(parse_datetime).transpose()?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            anyhow::bail!("--start ({start}) is after --end ({end})");
        }
    }

    for (index, history) in load_histories(file)?.iter().enumerate() {
        let secs = playtime_for(history, config, mode, start, end);
        println!(
            "{}: {} {mode}",
            history_label(&history.user, index),
            format_playtime(secs)
        );
    }

    Ok(())
}
