//! Clients command: play time per emulator client.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use playlog_core::{ClientUsage, Timeline, TimelineConfig, UserAgentDecoder};

use super::util::{format_duration, history_label, load_histories};

/// Formats a client breakdown, listing the raw agents under each label.
pub fn format_breakdown(label: &str, breakdown: &[ClientUsage]) -> String {
    let mut output = String::new();
    writeln!(output, "CLIENTS: {label}").unwrap();

    if breakdown.is_empty() {
        writeln!(output, "  (no client information recorded)").unwrap();
        return output;
    }

    for usage in breakdown {
        writeln!(
            output,
            "  {:<30} {:>7}  {:>5.1}%",
            usage.label.to_string(),
            format_duration(usage.duration),
            usage.duration_percentage
        )
        .unwrap();
        for agent in &usage.agents {
            writeln!(output, "    {agent}").unwrap();
        }
    }
    output
}

/// Runs the clients command.
pub fn run(file: &Path, config: &TimelineConfig) -> Result<()> {
    let histories = load_histories(file)?;

    let mut sections = Vec::with_capacity(histories.len());
    for (index, history) in histories.iter().enumerate() {
        let label = history_label(&history.user, index);
        let breakdown = Timeline::from_history(history, config)
            .client_breakdown(&UserAgentDecoder)
            .with_context(|| format!("failed to decode clients for {label}"))?;
        sections.push(format_breakdown(&label, &breakdown));
    }
    print!("{}", sections.join("\n"));

    Ok(())
}
