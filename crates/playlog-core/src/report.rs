//! Full activity reports over batches of histories.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::client::{ClientDecoder, ClientUsage};
use crate::error::{BoxError, Result};
use crate::metrics::{AchievementSetMetrics, BeatProgressMetrics, OncePerSet};
use crate::records::{ActivityHistory, AchievementSet};
use crate::summary::ActivitySummary;
use crate::timeline::{Timeline, TimelineConfig};
use crate::types::{GameId, UnlockMode};

/// Every metric derived from one player's history on one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    pub summary: ActivitySummary,
    pub last_played_at: Option<DateTime<Utc>>,
    pub playtime_hardcore: Option<i64>,
    pub playtime_softcore: Option<i64>,
    pub clients: Vec<ClientUsage>,
    pub achievement_sets: Vec<AchievementSetMetrics>,
    /// Measured against the first (core) achievement set, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beat: Option<BeatProgressMetrics>,
}

/// Builds the report for a single history.
///
/// Sets without a publish time get one inferred from the earliest unlock of
/// any of their achievements. A set with neither is left out of the report,
/// and so is its beat progress when it is the core set.
pub fn build_report<D: ClientDecoder + ?Sized>(
    history: &ActivityHistory,
    config: &TimelineConfig,
    decoder: &D,
) -> Result<ActivityReport> {
    let timeline = Timeline::from_history(history, config);
    let summary = timeline.summarize();
    let mut resolver = OncePerSet::new(|set: &AchievementSet| infer_published_at(&timeline, set));
    let has_publish_time =
        |set: &AchievementSet| set.achievements_published_at.is_some() || earliest_unlock(&timeline, set).is_some();

    let mut achievement_sets = Vec::with_capacity(history.achievement_sets.len());
    for set in &history.achievement_sets {
        if set.published_achievements() > 0 && !has_publish_time(set) {
            tracing::warn!(set_id = %set.id, "skipping achievement set with no publish time and no unlocks");
            continue;
        }
        achievement_sets.push(timeline.achievement_set_metrics(set, history.last_reset_at, &summary, &mut resolver)?);
    }

    let beat = history
        .achievement_sets
        .first()
        .filter(|&set| has_publish_time(set))
        .map(|set| timeline.beat_progress_metrics(set, &history.progress, &summary, &mut resolver))
        .transpose()?;

    Ok(ActivityReport {
        user: history.user.clone(),
        game_id: history.game_id,
        summary,
        last_played_at: timeline.last_played_at(),
        playtime_hardcore: timeline.calculate_playtime(None, None, UnlockMode::Hardcore, &summary),
        playtime_softcore: timeline.calculate_playtime(None, None, UnlockMode::Softcore, &summary),
        clients: timeline.client_breakdown(decoder)?,
        achievement_sets,
        beat,
    })
}

/// Builds reports for independent histories in parallel.
///
/// Each history gets its own timeline; results keep input order.
pub fn build_reports<D: ClientDecoder + Sync + ?Sized>(
    histories: &[ActivityHistory],
    config: &TimelineConfig,
    decoder: &D,
) -> Vec<Result<ActivityReport>> {
    histories
        .par_iter()
        .map(|history| build_report(history, config, decoder))
        .collect()
}

fn earliest_unlock(timeline: &Timeline, set: &AchievementSet) -> Option<DateTime<Utc>> {
    timeline
        .sessions()
        .iter()
        .flat_map(|session| &session.events)
        .filter(|event| event.achievement_id().is_some_and(|id| set.contains(id)))
        .map(|event| event.at)
        .min()
}

fn infer_published_at(
    timeline: &Timeline,
    set: &AchievementSet,
) -> std::result::Result<DateTime<Utc>, BoxError> {
    let at = earliest_unlock(timeline, set)
        .ok_or_else(|| format!("achievement set {} has no publish time and no unlocks", set.id))?;
    tracing::warn!(
        set_id = %set.id,
        %at,
        "achievement set has no publish time, using earliest unlock"
    );
    Ok(at)
}
