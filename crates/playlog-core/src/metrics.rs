//! Metrics derived for a specific achievement set.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ActivityError, BoxError, Result};
use crate::records::{AchievementSet, PlayerProgress};
use crate::summary::ActivitySummary;
use crate::timeline::Timeline;
use crate::types::{AchievementSetId, SetScope, UnlockMode};

/// Supplies the instant an achievement set's achievements were first
/// published, for sets that do not carry it yet.
///
/// Implementations typically compute the value and persist it, so they are
/// expected to be idempotent.
pub trait PublishedAtResolver {
    fn resolve(&mut self, set: &AchievementSet) -> std::result::Result<DateTime<Utc>, BoxError>;
}

impl<F> PublishedAtResolver for F
where
    F: FnMut(&AchievementSet) -> std::result::Result<DateTime<Utc>, BoxError>,
{
    fn resolve(&mut self, set: &AchievementSet) -> std::result::Result<DateTime<Utc>, BoxError> {
        self(set)
    }
}

/// Wraps a resolver so it runs at most once per set.
#[derive(Debug)]
pub struct OncePerSet<R> {
    inner: R,
    resolved: HashMap<AchievementSetId, DateTime<Utc>>,
}

impl<R> OncePerSet<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            resolved: HashMap::new(),
        }
    }
}

impl<R: PublishedAtResolver> PublishedAtResolver for OncePerSet<R> {
    fn resolve(&mut self, set: &AchievementSet) -> std::result::Result<DateTime<Utc>, BoxError> {
        if let Some(at) = self.resolved.get(&set.id) {
            return Ok(*at);
        }
        let at = self.inner.resolve(set)?;
        self.resolved.insert(set.id, at);
        Ok(at)
    }
}

/// Returns the set's publish time, resolving it if the set lacks one.
fn published_at<R: PublishedAtResolver + ?Sized>(
    set: &AchievementSet,
    resolver: &mut R,
) -> Result<DateTime<Utc>> {
    if let Some(at) = set.achievements_published_at {
        return Ok(at);
    }
    tracing::debug!(set_id = %set.id, "resolving achievements publish time");
    resolver
        .resolve(set)
        .map_err(|source| ActivityError::PublishedAt {
            set_id: set.id,
            source,
        })
}

/// Time to beat and complete a set, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatProgressMetrics {
    pub beat_playtime_softcore: Option<i64>,
    pub beat_playtime_hardcore: Option<i64>,
    pub completion_playtime_softcore: Option<i64>,
    pub completion_playtime_hardcore: Option<i64>,
}

/// Unlock span and play time attributed to one achievement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSetMetrics {
    pub achievement_set_id: AchievementSetId,
    /// Play time before the set's achievements were published.
    pub dev_time: Option<i64>,
    pub achievement_playtime_softcore: Option<i64>,
    pub achievement_playtime_hardcore: Option<i64>,
    pub first_unlock_softcore: Option<DateTime<Utc>>,
    pub last_unlock_softcore: Option<DateTime<Utc>>,
    pub first_unlock_hardcore: Option<DateTime<Utc>>,
    pub last_unlock_hardcore: Option<DateTime<Utc>>,
    pub unlocks_softcore: u32,
    pub unlocks_hardcore: u32,
}

/// Earliest and latest instant seen.
#[derive(Debug, Clone, Copy, Default)]
struct Span {
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

impl Span {
    fn include(&mut self, at: DateTime<Utc>) {
        self.first = Some(self.first.map_or(at, |t| t.min(at)));
        self.last = Some(self.last.map_or(at, |t| t.max(at)));
    }
}

impl Timeline {
    /// Play time from the set's publish time until the player beat and
    /// completed it, per mode.
    ///
    /// The publish time is resolved through `resolver` if the set lacks one.
    /// A softcore milestone falls back to its hardcore counterpart, since
    /// hardcore implies softcore.
    pub fn beat_progress_metrics<R: PublishedAtResolver + ?Sized>(
        &self,
        set: &AchievementSet,
        progress: &PlayerProgress,
        summary: &ActivitySummary,
        resolver: &mut R,
    ) -> Result<BeatProgressMetrics> {
        let published = published_at(set, resolver)?;

        let until = |at: Option<DateTime<Utc>>, mode| {
            at.and_then(|at| self.calculate_playtime(Some(published), Some(at), mode, summary))
        };

        Ok(BeatProgressMetrics {
            beat_playtime_softcore: until(
                progress.beaten_at.or(progress.beaten_hardcore_at),
                UnlockMode::Softcore,
            ),
            beat_playtime_hardcore: until(progress.beaten_hardcore_at, UnlockMode::Hardcore),
            completion_playtime_softcore: until(
                progress.completed_at.or(progress.completed_hardcore_at),
                UnlockMode::Softcore,
            ),
            completion_playtime_hardcore: until(progress.completed_hardcore_at, UnlockMode::Hardcore),
        })
    }

    /// Unlock span and play time for the achievements of one set.
    ///
    /// Sessions tied to a different set are ignored. With no published
    /// achievements, all tracked play time is development time. Otherwise
    /// development time ends at the publish time, and achievement play time
    /// starts at the later of the publish time and `last_reset_at`, running
    /// until the last unlock in each mode.
    pub fn achievement_set_metrics<R: PublishedAtResolver + ?Sized>(
        &self,
        set: &AchievementSet,
        last_reset_at: Option<DateTime<Utc>>,
        summary: &ActivitySummary,
        resolver: &mut R,
    ) -> Result<AchievementSetMetrics> {
        let scope = SetScope::Set(set.id);
        let mut softcore = Span::default();
        let mut hardcore = Span::default();
        let mut unlocks_softcore = 0u32;
        let mut unlocks_hardcore = 0u32;

        for session in self.sessions() {
            if !session.scope.accepts(scope) {
                continue;
            }
            for event in &session.events {
                let Some(unlock) = event.as_unlock() else {
                    continue;
                };
                if !set.contains(unlock.achievement_id) {
                    continue;
                }
                if unlock.hardcore {
                    hardcore.include(event.at);
                    unlocks_hardcore += 1;
                } else {
                    softcore.include(event.at);
                    unlocks_softcore += 1;
                }
            }
        }
        // Hardcore unlocks stand in only when no softcore-only unlock exists.
        let softcore = if softcore.first.is_none() { hardcore } else { softcore };

        let mut metrics = AchievementSetMetrics {
            achievement_set_id: set.id,
            dev_time: None,
            achievement_playtime_softcore: None,
            achievement_playtime_hardcore: None,
            first_unlock_softcore: softcore.first,
            last_unlock_softcore: softcore.last,
            first_unlock_hardcore: hardcore.first,
            last_unlock_hardcore: hardcore.last,
            unlocks_softcore,
            unlocks_hardcore,
        };

        if set.published_achievements() == 0 {
            metrics.dev_time = (summary.total_playtime > 0).then_some(summary.total_playtime);
            return Ok(metrics);
        }

        let published = published_at(set, resolver)?;
        metrics.dev_time = self.calculate_playtime(None, Some(published), UnlockMode::Softcore, summary);

        let lower = last_reset_at.map_or(published, |reset| reset.max(published));
        metrics.achievement_playtime_softcore = softcore
            .last
            .and_then(|last| self.calculate_playtime(Some(lower), Some(last), UnlockMode::Softcore, summary));
        metrics.achievement_playtime_hardcore = hardcore
            .last
            .and_then(|last| self.calculate_playtime(Some(lower), Some(last), UnlockMode::Hardcore, summary));

        Ok(metrics)
    }
}
