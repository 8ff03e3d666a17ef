//! Timeline command: dump reconstructed sessions as JSON.

use std::path::Path;

use anyhow::Result;
use playlog_core::{ActivityHistory, Timeline, TimelineConfig};
use serde::Serialize;

use super::util::load_histories;

#[derive(Serialize)]
struct TimelineDump<'a> {
    user: &'a str,
    #[serde(flatten)]
    timeline: Timeline,
}

/// Serializes the reconstructed timeline of every history.
pub fn format_timelines(histories: &[ActivityHistory], config: &TimelineConfig) -> Result<String> {
    let dumps: Vec<TimelineDump<'_>> = histories
        .iter()
        .map(|history| TimelineDump {
            user: &history.user,
            timeline: Timeline::from_history(history, config),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&dumps)?)
}

/// Runs the timeline command.
pub fn run(file: &Path, config: &TimelineConfig) -> Result<()> {
    let histories = load_histories(file)?;
    println!("{}", format_timelines(&histories, config)?);
    Ok(())
}
