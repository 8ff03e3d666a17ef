//! Report command: every metric for every history.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use playlog_core::{ActivityReport, TimelineConfig, UserAgentDecoder, build_reports};

use super::util::{format_duration, format_instant, format_playtime, history_label, load_all};

/// Formats one report as human-readable text.
pub fn format_report(report: &ActivityReport, index: usize) -> String {
    let mut output = String::new();

    let label = history_label(&report.user, index);
    match report.game_id {
        Some(game_id) => writeln!(output, "PLAYER ACTIVITY: {label} (game {game_id})").unwrap(),
        None => writeln!(output, "PLAYER ACTIVITY: {label}").unwrap(),
    }

    let summary = &report.summary;
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "  Total playtime:     {}", format_duration(summary.total_playtime)).unwrap();
    writeln!(output, "  Hardcore:           {}", format_playtime(report.playtime_hardcore)).unwrap();
    writeln!(output, "  Softcore:           {}", format_playtime(report.playtime_softcore)).unwrap();
    writeln!(output, "  Achievement time:   {}", format_duration(summary.achievement_playtime)).unwrap();
    writeln!(
        output,
        "  Unlocks:            {} in {} sessions",
        summary.achievements_unlocked, summary.achievement_session_count
    )
    .unwrap();
    writeln!(output, "  Last played:        {}", format_instant(report.last_played_at)).unwrap();

    if !report.achievement_sets.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "ACHIEVEMENT SETS").unwrap();
        writeln!(output, "────────────────").unwrap();
        for set in &report.achievement_sets {
            writeln!(output, "  Set {}", set.achievement_set_id).unwrap();
            writeln!(output, "    Development:      {}", format_playtime(set.dev_time)).unwrap();
            writeln!(
                output,
                "    Softcore:         {} ({} unlocks)",
                format_playtime(set.achievement_playtime_softcore),
                set.unlocks_softcore
            )
            .unwrap();
            writeln!(
                output,
                "    Hardcore:         {} ({} unlocks)",
                format_playtime(set.achievement_playtime_hardcore),
                set.unlocks_hardcore
            )
            .unwrap();
        }
    }

    if let Some(beat) = &report.beat {
        writeln!(output).unwrap();
        writeln!(output, "TIME TO BEAT").unwrap();
        writeln!(output, "────────────").unwrap();
        writeln!(
            output,
            "  Beaten:             {} softcore, {} hardcore",
            format_playtime(beat.beat_playtime_softcore),
            format_playtime(beat.beat_playtime_hardcore)
        )
        .unwrap();
        writeln!(
            output,
            "  Completed:          {} softcore, {} hardcore",
            format_playtime(beat.completion_playtime_softcore),
            format_playtime(beat.completion_playtime_hardcore)
        )
        .unwrap();
    }

    if !report.clients.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "CLIENTS").unwrap();
        writeln!(output, "───────").unwrap();
        for usage in &report.clients {
            writeln!(
                output,
                "  {:<30} {:>7}  {:>5.1}%",
                usage.label.to_string(),
                format_duration(usage.duration),
                usage.duration_percentage
            )
            .unwrap();
        }
    }

    output
}

/// Formats reports as JSON.
pub fn format_reports_json(reports: &[ActivityReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run(files: &[PathBuf], json: bool, config: &TimelineConfig) -> Result<()> {
    let histories = load_all(files)?;

    let reports = build_reports(&histories, config, &UserAgentDecoder)
        .into_iter()
        .zip(&histories)
        .enumerate()
        .map(|(index, (report, history))| {
            report.with_context(|| {
                format!("failed to build report for {}", history_label(&history.user, index))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", format_reports_json(&reports)?);
    } else {
        let text: Vec<String> = reports
            .iter()
            .enumerate()
            .map(|(index, report)| format_report(report, index))
            .collect();
        print!("{}", text.join("\n"));
    }

    Ok(())
}
