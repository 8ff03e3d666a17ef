//! Aggregate totals across the whole timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;

/// Totals computed by [`Timeline::summarize`].
///
/// All durations are in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Unlock events on the player's own sessions. An achievement unlocked
    /// in softcore and later in hardcore counts twice.
    pub achievements_unlocked: u32,

    /// Time spent in sessions that earned achievements, including gaps
    /// between them, plus the adjustment for reconstructed sessions.
    pub achievement_playtime: i64,

    /// Number of sessions that contain at least one unlock.
    pub achievement_session_count: u32,

    /// Estimated play time credited to each reconstructed session, whose
    /// natural duration only spans its unlocks.
    pub generated_session_adjustment: i64,

    /// Span between the first and last unlock.
    pub total_unlock_time: i64,

    /// Total play time, including the reconstructed session adjustment.
    pub total_playtime: i64,

    pub first_unlock_at: Option<DateTime<Utc>>,
    pub last_unlock_at: Option<DateTime<Utc>>,
}

impl Timeline {
    /// Computes aggregate totals.
    ///
    /// Manual unlock sessions are skipped entirely: they are somebody
    /// else's activity. Play between two achievement-earning sessions counts
    /// toward achievement playtime; play before the first or after the last
    /// does not.
    pub fn summarize(&self) -> ActivitySummary {
        let mut summary = ActivitySummary::default();
        let mut intermediate_time = 0i64;
        let mut reconstructed_sessions = 0i64;
        let mut reconstructed_unlock_sessions = 0i64;

        for session in self.sessions() {
            if session.kind.is_manual_unlock() {
                continue;
            }

            summary.total_playtime += session.duration_secs;

            let mut has_achievements = false;
            for event in &session.events {
                if event.as_unlock().is_none() {
                    continue;
                }
                has_achievements = true;
                summary.achievements_unlocked += 1;
                summary.first_unlock_at =
                    Some(summary.first_unlock_at.map_or(event.at, |t| t.min(event.at)));
                summary.last_unlock_at =
                    Some(summary.last_unlock_at.map_or(event.at, |t| t.max(event.at)));
            }

            if has_achievements {
                summary.achievement_playtime += intermediate_time + session.duration_secs;
                summary.achievement_session_count += 1;
                intermediate_time = 0;
            } else if summary.achievement_session_count > 0 && session.kind.is_recorded() {
                // Only folded in once a later session earns something.
                intermediate_time += session.duration_secs;
            }

            if session.kind.is_reconstructed() {
                reconstructed_sessions += 1;
                if has_achievements {
                    reconstructed_unlock_sessions += 1;
                }
            }
        }

        if summary.achievements_unlocked > 0 {
            summary.generated_session_adjustment =
                summary.achievement_playtime / i64::from(summary.achievements_unlocked);
        }
        summary.total_playtime += summary.generated_session_adjustment * reconstructed_sessions;
        summary.achievement_playtime +=
            summary.generated_session_adjustment * reconstructed_unlock_sessions;

        if let (Some(first), Some(last)) = (summary.first_unlock_at, summary.last_unlock_at) {
            summary.total_unlock_time = (last - first).num_seconds();
        }

        summary
    }
}
